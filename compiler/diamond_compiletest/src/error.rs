//! Errors raised by the compiler wrapper and by discovery.

use std::path::PathBuf;

use diamond_loader::LoadError;
use thiserror::Error;

/// Faults while invoking the compiler.
///
/// Ordinary compilation failure is not an error: the wrapper reports it
/// as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The compiler executable could not be found.
    #[error("compiler '{program}' not found: {message}")]
    CompilerNotFound { program: String, message: String },

    /// The compiler could not be started or waited on.
    #[error("failed to run '{program}': {message}")]
    Launch { program: String, message: String },

    /// Reading or writing the scratch workspace, a source, or an artifact.
    #[error("cannot {action} {}: {message}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        message: String,
    },

    /// A unit name that does not map to a relative source path.
    #[error("invalid unit name '{0}'")]
    InvalidUnitName(String),
}

impl CompileError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        CompileError::Io {
            action,
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Faults that abort a whole discovery run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The scan root is missing or not a directory.
    #[error("scan root must be a directory: {}", .0.display())]
    InvalidScanRoot(PathBuf),

    /// A source file under the scan root failed to compile.
    #[error("could not compile {unit}")]
    Compiler { unit: String },

    /// A processor test declaration that cannot be turned into a case.
    #[error("unsupported processor test in {unit}: {reason}")]
    Unsupported { unit: String, reason: String },

    /// The compiler itself could not be run.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A classpath jar could not be opened.
    #[error("cannot open classpath: {0}")]
    Classpath(#[source] LoadError),

    /// A compiled class or one of its supertypes could not be loaded.
    #[error("cannot load classes of {unit}: {source}")]
    Load {
        unit: String,
        #[source]
        source: LoadError,
    },

    /// Walking the scan root or reading an expected-source file failed.
    #[error("cannot read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
}
