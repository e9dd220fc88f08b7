//! The loader's view of a defined class.

use std::path::PathBuf;

use diamond_classfile::{AccessFlags, ClassFile, ResolvedAnnotation};

use crate::error::{LoadError, Result};

/// Where a class definition came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassOrigin {
    /// Bytes handed to an [`IsolatedClassLoader`](crate::IsolatedClassLoader).
    Isolated,
    /// A directory or jar on the classpath.
    Classpath(PathBuf),
    /// The built-in platform table.
    Platform,
}

/// A defined class: enough of its class file to answer reflective
/// questions about its supertypes and type-level annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedClass {
    /// Binary name (`com.example.Foo`).
    pub name: String,
    pub access: AccessFlags,
    /// `None` only for `java.lang.Object`.
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    /// Runtime-visible annotations declared on the class itself.
    pub annotations: Vec<ResolvedAnnotation>,
    pub origin: ClassOrigin,
}

impl LoadedClass {
    /// Define a class from class file bytes.
    pub fn from_bytes(bytes: &[u8], origin: ClassOrigin) -> Result<Self> {
        let malformed = |source| LoadError::Malformed {
            name: String::from("<unknown>"),
            source,
        };
        let class = ClassFile::parse(bytes).map_err(malformed)?;
        let name = class.name().map_err(malformed)?;
        let with_name = |source| LoadError::Malformed {
            name: name.clone(),
            source,
        };
        Ok(LoadedClass {
            access: class.access_flags,
            super_name: class.super_name().map_err(with_name)?,
            interfaces: class.interface_names().map_err(with_name)?,
            annotations: class.runtime_visible_annotations().map_err(with_name)?,
            name,
            origin,
        })
    }

    /// Whether this is an annotation interface.
    pub fn is_annotation(&self) -> bool {
        self.access.is_annotation()
    }

    pub fn is_interface(&self) -> bool {
        self.access.is_interface()
    }

    /// First annotation whose type descriptor is `descriptor`.
    pub fn annotation(&self, descriptor: &str) -> Option<&ResolvedAnnotation> {
        self.annotations.iter().find(|a| a.descriptor == descriptor)
    }
}
