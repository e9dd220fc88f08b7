//! The compiler behind the wrapper.
//!
//! [`CompilerBackend`] is the only place a Java compiler is touched.
//! [`JavacBackend`] runs the system `javac`; tests substitute a scripted
//! backend so the wrapper and the discovery pipeline can be exercised
//! without a JDK.

mod javac;

use std::path::{Path, PathBuf};

use crate::error::CompileError;

pub use javac::{JavacBackend, JavacVersion, REQUIRED_EXPORTS};

/// An annotation processor to attach to one compilation.
#[derive(Clone, Copy, Debug)]
pub struct ProcessorSpec<'a> {
    /// Binary name of the processor class.
    pub class_name: &'a str,
    /// Directory holding the processor's class files.
    pub path: &'a Path,
}

/// Everything a backend needs for one invocation.
#[derive(Clone, Debug)]
pub struct CompileRequest<'a> {
    /// The single source file to compile.
    pub source_file: &'a Path,
    pub classpath: &'a [PathBuf],
    /// Where class files go.
    pub output_dir: &'a Path,
    /// Where processor-generated sources go.
    pub generated_dir: &'a Path,
    /// With `None`, annotation processing is disabled entirely.
    pub processor: Option<ProcessorSpec<'a>>,
}

/// Runs one compilation.
///
/// Returns `Ok(false)` when the compiler ran and reported errors; `Err`
/// only when it could not be run at all.
pub trait CompilerBackend: Send + Sync {
    fn compile(&self, request: &CompileRequest<'_>) -> Result<bool, CompileError>;
}
