//! A scripted [`CompilerBackend`] for tests that must run without a JDK.

use std::path::{Path, PathBuf};

use diamond_classfile::names::binary_to_internal;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::backend::{CompileRequest, CompilerBackend};
use crate::error::CompileError;

/// `(binary name, class bytes)` outputs of one scripted compilation.
pub(crate) type Outputs = Vec<(String, Vec<u8>)>;

/// What the backend saw on one call.
#[derive(Clone, Debug)]
pub(crate) struct RecordedCall {
    pub source_file: PathBuf,
    pub source: Option<String>,
    pub classpath: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub processor: Option<String>,
    /// Whether the processor's own class file was on its processor path.
    pub processor_present: bool,
}

/// Answers compilations from a script instead of running `javac`.
///
/// Without a processor, the source text selects the outputs; with one,
/// the processor name does, standing in for whatever the processor
/// would have generated. Anything unscripted fails to compile.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    sources: FxHashMap<String, Outputs>,
    processors: FxHashMap<String, Outputs>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        ScriptedBackend::default()
    }

    /// Compiling text equal to `source` (ignoring surrounding whitespace)
    /// succeeds with `outputs`.
    #[must_use]
    pub fn source(mut self, source: &str, outputs: Outputs) -> Self {
        self.sources.insert(source.trim().to_string(), outputs);
        self
    }

    /// Compiling anything with `processor` attached succeeds with `outputs`.
    #[must_use]
    pub fn processor(mut self, processor: &str, outputs: Outputs) -> Self {
        self.processors.insert(processor.to_string(), outputs);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

impl CompilerBackend for ScriptedBackend {
    fn compile(&self, request: &CompileRequest<'_>) -> Result<bool, CompileError> {
        let source = std::fs::read_to_string(request.source_file).ok();
        let processor_present = request.processor.is_some_and(|p| {
            class_path(p.path, p.class_name).is_file()
        });
        self.calls.lock().push(RecordedCall {
            source_file: request.source_file.to_path_buf(),
            source: source.clone(),
            classpath: request.classpath.to_vec(),
            output_dir: request.output_dir.to_path_buf(),
            processor: request.processor.map(|p| p.class_name.to_string()),
            processor_present,
        });

        let outputs = match (request.processor, source) {
            (Some(p), Some(_)) => self.processors.get(p.class_name),
            (None, Some(text)) => self.sources.get(text.trim()),
            (_, None) => None,
        };
        let Some(outputs) = outputs else {
            return Ok(false);
        };
        for (name, bytes) in outputs {
            let path = class_path(request.output_dir, name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CompileError::io("create", parent, &e))?;
            }
            std::fs::write(&path, bytes).map_err(|e| CompileError::io("write", &path, &e))?;
        }
        Ok(true)
    }
}

fn class_path(dir: &Path, binary_name: &str) -> PathBuf {
    dir.join(format!("{}.class", binary_to_internal(binary_name)))
}
