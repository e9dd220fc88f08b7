//! Class resolution errors.

use std::path::PathBuf;

use diamond_classfile::ClassFileError;
use thiserror::Error;

/// Error type for class resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Neither the loader's own table nor any parent knows the name.
    #[error("class not found: {0}")]
    NotFound(String),

    /// The bytes registered under a name define a different class.
    #[error("bytes registered as `{expected}` define `{found}`")]
    WrongName { expected: String, found: String },

    /// The bytes registered under a name are not a valid class file.
    #[error("malformed class `{name}`: {source}")]
    Malformed {
        name: String,
        #[source]
        source: ClassFileError,
    },

    /// A classpath directory entry could not be read.
    #[error("cannot read {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// A classpath jar could not be opened or read.
    #[error("cannot read archive {path}: {message}")]
    Archive { path: PathBuf, message: String },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn archive(path: impl Into<PathBuf>, err: &impl std::fmt::Display) -> Self {
        LoadError::Archive {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = LoadError> = std::result::Result<T, E>;
