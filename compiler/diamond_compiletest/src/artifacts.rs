//! The files produced by one compiler invocation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::error::CompileError;
use crate::unit::unit_name;

/// One file from the compiler's output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the output directory.
    pub relative_path: PathBuf,
    pub bytes: Arc<[u8]>,
}

/// Immutable `dotted name -> artifact` map from a single compilation.
///
/// Cloning shares the underlying map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompiledArtifactSet {
    artifacts: Arc<BTreeMap<String, Artifact>>,
}

impl CompiledArtifactSet {
    /// Read every regular file under `root`.
    ///
    /// Class files are keyed by binary name (`com.example.Foo$1`); other
    /// files by their relative path with separators replaced by `.`.
    pub fn collect(root: &Path) -> Result<Self, CompileError> {
        let mut artifacts = BTreeMap::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| walk_error(root, &e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .map_err(|_| CompileError::InvalidUnitName(entry.path().display().to_string()))?;
            let name = unit_name(&relative, "class")
                .ok_or_else(|| CompileError::InvalidUnitName(relative.display().to_string()))?;
            let bytes = std::fs::read(entry.path())
                .map_err(|e| CompileError::io("read", entry.path(), &e))?;
            artifacts.insert(
                name,
                Artifact {
                    relative_path: relative,
                    bytes: bytes.into(),
                },
            );
        }
        tracing::trace!(root = %root.display(), count = artifacts.len(), "collected artifacts");
        Ok(CompiledArtifactSet {
            artifacts: Arc::new(artifacts),
        })
    }

    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.artifacts.contains_key(name)
    }

    /// Names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.artifacts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Artifact)> + '_ {
        self.artifacts.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// `(binary name, bytes)` pairs of the class files only, the shape an
    /// [`IsolatedClassLoader`](diamond_loader::IsolatedClassLoader) is
    /// built from.
    pub fn classes(&self) -> impl Iterator<Item = (String, Arc<[u8]>)> + '_ {
        self.artifacts
            .iter()
            .filter(|(_, a)| a.relative_path.extension().is_some_and(|e| e == "class"))
            .map(|(name, a)| (name.clone(), Arc::clone(&a.bytes)))
    }

    /// Recreate every artifact under `dir` at its relative path.
    pub fn write_to(&self, dir: &Path) -> Result<(), CompileError> {
        for artifact in self.artifacts.values() {
            let path = dir.join(&artifact.relative_path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CompileError::io("create", parent, &e))?;
            }
            std::fs::write(&path, &artifact.bytes)
                .map_err(|e| CompileError::io("write", &path, &e))?;
        }
        Ok(())
    }
}

fn walk_error(root: &Path, err: &walkdir::Error) -> CompileError {
    CompileError::Io {
        action: "walk",
        path: err.path().unwrap_or(root).to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
