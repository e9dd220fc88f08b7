//! Per-invocation scratch directories.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::CompileError;
use crate::unit::unit_path;

/// A fresh temporary directory for one compiler invocation.
///
/// Layout:
///
/// ```text
/// diamond-XXXXXX/
///   classes/     compiler output; the only directory collected
///   sources/     inline source handed to the compiler
///   generated/   sources written by an attached processor
///   processor/   class files of the attached processor
/// ```
///
/// The directory is removed by [`ScratchWorkspace::close`], which reports
/// deletion faults, or on drop along every other path.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: TempDir,
}

impl ScratchWorkspace {
    const CLASSES: &'static str = "classes";
    const SOURCES: &'static str = "sources";
    const GENERATED: &'static str = "generated";
    const PROCESSOR: &'static str = "processor";

    pub fn create() -> Result<Self, CompileError> {
        let dir = tempfile::Builder::new()
            .prefix("diamond-")
            .tempdir()
            .map_err(|e| CompileError::io("create", std::env::temp_dir(), &e))?;
        for sub in [Self::CLASSES, Self::SOURCES, Self::GENERATED, Self::PROCESSOR] {
            let path = dir.path().join(sub);
            std::fs::create_dir(&path).map_err(|e| CompileError::io("create", &path, &e))?;
        }
        tracing::trace!(root = %dir.path().display(), "created scratch workspace");
        Ok(ScratchWorkspace { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn classes_dir(&self) -> PathBuf {
        self.root().join(Self::CLASSES)
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.root().join(Self::SOURCES)
    }

    pub fn generated_dir(&self) -> PathBuf {
        self.root().join(Self::GENERATED)
    }

    pub fn processor_dir(&self) -> PathBuf {
        self.root().join(Self::PROCESSOR)
    }

    /// Write `source` to `sources/<unit path>.java` and return that path.
    pub fn write_source(&self, unit: &str, source: &str) -> Result<PathBuf, CompileError> {
        let mut path = self.sources_dir();
        path.push(unit_path(unit, "java")?);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CompileError::io("create", parent, &e))?;
        }
        std::fs::write(&path, source).map_err(|e| CompileError::io("write", &path, &e))?;
        Ok(path)
    }

    /// Delete the workspace, reporting a failure to do so.
    pub fn close(self) -> Result<(), CompileError> {
        let root = self.root().to_path_buf();
        self.dir
            .close()
            .map_err(|e| CompileError::io("delete", &root, &e))
    }
}
