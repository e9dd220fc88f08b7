//! Source unit names and the paths they map to.

use std::path::{Component, Path, PathBuf};

use crate::error::CompileError;

/// `com.example.Foo` + `java` -> `com/example/Foo.java`.
///
/// Rejects names that are empty, contain an empty segment, or have a
/// segment that is a path component other than a plain name.
pub fn unit_path(unit: &str, extension: &str) -> Result<PathBuf, CompileError> {
    let invalid = || CompileError::InvalidUnitName(unit.to_string());
    let mut path = PathBuf::new();
    for segment in unit.split('.') {
        let mut components = Path::new(segment).components();
        let plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !plain || segment.contains(['/', '\\']) {
            return Err(invalid());
        }
        path.push(segment);
    }
    path.set_extension(extension);
    Ok(path)
}

/// `com/example/Foo.java` relative to its root -> `com.example.Foo`.
///
/// Only a trailing `.extension` is removed: `Outer$Inner.class` keeps its
/// `$`, and a file with any other suffix keeps its whole name.
pub fn unit_name(relative: &Path, extension: &str) -> Option<String> {
    let mut segments = Vec::new();
    for component in relative.components() {
        let Component::Normal(s) = component else {
            return None;
        };
        segments.push(s.to_str()?);
    }
    let joined = segments.join(".");
    let name = joined
        .strip_suffix(extension)
        .and_then(|n| n.strip_suffix('.'))
        .unwrap_or(&joined);
    (!name.is_empty()).then(|| name.to_string())
}
