//! The `@ProcessorTest` declaration read off a processor class.

use std::fmt;
use std::path::PathBuf;

use diamond_classfile::names::{descriptor_to_binary, is_array_descriptor};
use diamond_classfile::{ResolvedAnnotation, ResolvedValue};

use crate::error::DiscoveryError;

/// Descriptor of the declaration annotation.
pub const PROCESSOR_TEST_DESCRIPTOR: &str = "Lorg/transparent/diamond/compiletest/ProcessorTest;";

/// Marker used when the declaration names none. Element defaults live
/// in the annotation type, not at the use site, so an absent element is
/// read as this default.
pub const DEFAULT_MARKER: &str = "org.transparent.diamond.compiletest.AnnotationForTesting";

const ELEMENT_TYPE_DESCRIPTOR: &str = "Ljava/lang/annotation/ElementType;";

/// The kind of declaration the stub marks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    Type,
    Method,
    Constructor,
    Field,
}

impl TargetKind {
    /// From a `java.lang.annotation.ElementType` constant name.
    pub fn from_element_type(constant: &str) -> Option<Self> {
        match constant {
            "TYPE" => Some(TargetKind::Type),
            "METHOD" => Some(TargetKind::Method),
            "CONSTRUCTOR" => Some(TargetKind::Constructor),
            "FIELD" => Some(TargetKind::Field),
            _ => None,
        }
    }

    pub fn element_type(self) -> &'static str {
        match self {
            TargetKind::Type => "TYPE",
            TargetKind::Method => "METHOD",
            TargetKind::Constructor => "CONSTRUCTOR",
            TargetKind::Field => "FIELD",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_type())
    }
}

/// Where the expected source comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpectedSource {
    /// Relative to the scan root.
    File(PathBuf),
    /// Lines, joined with `\n`.
    Inline(Vec<String>),
    /// Neither form was given. The case is kept and fails when run.
    Missing,
}

/// A validated test declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestDeclaration {
    /// Binary name of the marker annotation to place on the stub.
    pub marker: String,
    pub target: TargetKind,
    pub expected: ExpectedSource,
}

impl TestDeclaration {
    /// Read a `@ProcessorTest` annotation found on `unit`.
    ///
    /// Checks what can be checked without loading classes: the marker is
    /// a plain class literal and the target kind is supported.
    pub fn from_annotation(unit: &str, annotation: &ResolvedAnnotation) -> Result<Self, DiscoveryError> {
        let unsupported = |reason: String| DiscoveryError::Unsupported {
            unit: unit.to_string(),
            reason,
        };

        let marker = match annotation.element("annotation") {
            None => DEFAULT_MARKER.to_string(),
            Some(ResolvedValue::Class(descriptor)) if !is_array_descriptor(descriptor) => {
                descriptor_to_binary(descriptor)
                    .ok_or_else(|| unsupported(NOT_AN_ANNOTATION.to_string()))?
            }
            Some(_) => return Err(unsupported(NOT_AN_ANNOTATION.to_string())),
        };

        let target = match annotation.element("target") {
            Some(ResolvedValue::Enum { descriptor, constant })
                if descriptor == ELEMENT_TYPE_DESCRIPTOR =>
            {
                TargetKind::from_element_type(constant)
                    .ok_or_else(|| unsupported(format!("Unsupported test target type {constant}")))?
            }
            Some(other) => {
                return Err(unsupported(format!("Unsupported test target type {other:?}")));
            }
            None => return Err(unsupported("missing test target type".to_string())),
        };

        Ok(TestDeclaration {
            marker,
            target,
            expected: expected_source(unit, annotation),
        })
    }
}

pub(crate) const NOT_AN_ANNOTATION: &str = "annotation must be an annotation class";

/// `expectedFile` when non-empty, else `expected` (or its older name
/// `source`) when non-empty.
fn expected_source(unit: &str, annotation: &ResolvedAnnotation) -> ExpectedSource {
    let file = annotation
        .element("expectedFile")
        .and_then(ResolvedValue::as_str)
        .filter(|f| !f.is_empty());
    let lines = ["expected", "source"]
        .into_iter()
        .find_map(|name| match annotation.element(name) {
            Some(ResolvedValue::Array(values)) if !values.is_empty() => Some(values),
            _ => None,
        })
        .map(|values| {
            values
                .iter()
                .filter_map(ResolvedValue::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

    match (file, lines) {
        (Some(file), lines) => {
            if lines.is_some() {
                tracing::warn!(unit, file, "both expected and expectedFile are set; using expectedFile");
            }
            ExpectedSource::File(PathBuf::from(file))
        }
        (None, Some(lines)) => ExpectedSource::Inline(lines),
        (None, None) => ExpectedSource::Missing,
    }
}
