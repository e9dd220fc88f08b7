use std::sync::Arc;

use dashmap::DashMap;
use diamond_classfile::AccessFlags;

use super::ClassResolver;
use crate::class::{ClassOrigin, LoadedClass};
use crate::error::{LoadError, Result};

const OBJECT: &str = "java.lang.Object";
const ANNOTATION: &str = "java.lang.annotation.Annotation";

/// JDK interfaces whose supertypes matter for classification.
const INTERFACES: &[(&str, &[&str])] = &[
    ("javax.annotation.processing.Processor", &[]),
    (ANNOTATION, &[]),
    ("java.io.Serializable", &[]),
    ("java.lang.Comparable", &[]),
    ("java.lang.CharSequence", &[]),
    ("java.lang.Runnable", &[]),
    ("java.lang.AutoCloseable", &[]),
    ("java.io.Closeable", &["java.lang.AutoCloseable"]),
];

/// JDK classes with a non-trivial supertype list.
const CLASSES: &[(&str, &str, &[&str])] = &[
    (
        "javax.annotation.processing.AbstractProcessor",
        OBJECT,
        &["javax.annotation.processing.Processor"],
    ),
    (
        "java.lang.String",
        OBJECT,
        &["java.io.Serializable", "java.lang.Comparable", "java.lang.CharSequence"],
    ),
    ("java.lang.Enum", OBJECT, &["java.lang.Comparable", "java.io.Serializable"]),
    ("java.lang.Record", OBJECT, &[]),
];

/// Annotation interfaces that test fixtures commonly reference.
const ANNOTATIONS: &[&str] = &[
    "java.lang.Deprecated",
    "java.lang.Override",
    "java.lang.SuppressWarnings",
    "java.lang.SafeVarargs",
    "java.lang.FunctionalInterface",
    "java.lang.annotation.Documented",
    "java.lang.annotation.Inherited",
    "java.lang.annotation.Retention",
    "java.lang.annotation.Target",
    "java.lang.annotation.Repeatable",
    "java.lang.annotation.Native",
    "javax.annotation.Generated",
    "javax.annotation.processing.Generated",
    "javax.annotation.processing.SupportedAnnotationTypes",
    "javax.annotation.processing.SupportedOptions",
    "javax.annotation.processing.SupportedSourceVersion",
];

/// Package prefixes owned by the platform. Names under these that are not
/// in the tables resolve to an opaque class extending `java.lang.Object`.
const PLATFORM_PACKAGES: &[&str] = &["java.", "javax.", "jdk.", "sun.", "com.sun."];

/// Built-in stand-in for the JDK's own class loader.
///
/// Only supertypes and annotation-ness are modeled; that is all the
/// classification walk needs. Definitions are created on first request
/// and cached, so a name always resolves to the same `Arc`.
#[derive(Debug, Default)]
pub struct PlatformClasses {
    defined: DashMap<String, Arc<LoadedClass>>,
}

impl PlatformClasses {
    pub fn new() -> Self {
        PlatformClasses::default()
    }

    /// Whether `name` lives in a platform-owned package.
    pub fn owns(name: &str) -> bool {
        PLATFORM_PACKAGES.iter().any(|p| name.starts_with(p))
    }

    fn define(name: &str) -> Option<LoadedClass> {
        let class = |access, super_name: Option<&str>, interfaces: &[&str]| LoadedClass {
            name: name.to_string(),
            access,
            super_name: super_name.map(str::to_string),
            interfaces: interfaces.iter().map(|s| (*s).to_string()).collect(),
            annotations: Vec::new(),
            origin: ClassOrigin::Platform,
        };
        let public_interface = AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT;

        if name == OBJECT {
            return Some(class(AccessFlags::PUBLIC, None, &[]));
        }
        if let Some(&(_, supers)) = INTERFACES.iter().find(|(n, _)| *n == name) {
            return Some(class(public_interface, Some(OBJECT), supers));
        }
        if let Some(&(_, super_name, interfaces)) = CLASSES.iter().find(|(n, _, _)| *n == name) {
            return Some(class(AccessFlags::PUBLIC, Some(super_name), interfaces));
        }
        if ANNOTATIONS.contains(&name) {
            return Some(class(
                public_interface | AccessFlags::ANNOTATION,
                Some(OBJECT),
                &[ANNOTATION],
            ));
        }
        if Self::owns(name) {
            return Some(class(AccessFlags::PUBLIC, Some(OBJECT), &[]));
        }
        None
    }
}

impl ClassResolver for PlatformClasses {
    fn resolve(&self, name: &str) -> Result<Arc<LoadedClass>> {
        if let Some(class) = self.defined.get(name) {
            return Ok(Arc::clone(&class));
        }
        let class = Self::define(name).ok_or_else(|| LoadError::NotFound(name.to_string()))?;
        let entry = self
            .defined
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(class));
        Ok(Arc::clone(&entry))
    }
}
