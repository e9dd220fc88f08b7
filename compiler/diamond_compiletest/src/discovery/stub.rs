//! Minimal sources that apply a marker to a predictably named target.

use super::declaration::TargetKind;

/// Name of the stub class, and so of the class both sides must produce.
pub const EXAMPLE_CLASS: &str = "Example";

/// The smallest compilation unit applying `marker` to a `kind` target
/// named `Example` or `example`.
pub fn stub_source(kind: TargetKind, marker: &str) -> String {
    // Nested annotation types are imported by their canonical name.
    let marker = marker.replace('$', ".");
    let member = match kind {
        TargetKind::Type => return format!("import {marker};\n@{marker}\npublic class Example {{}}"),
        TargetKind::Method => "public void example() {}",
        TargetKind::Constructor => "public Example() {}",
        TargetKind::Field => "public int example;",
    };
    format!("import {marker};\npublic class Example {{\n    @{marker}\n    {member}\n}}")
}
