//! The compiler invocation wrapper.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::artifacts::CompiledArtifactSet;
use crate::backend::{CompileRequest, CompilerBackend, JavacBackend, ProcessorSpec};
use crate::config::CompileTestConfig;
use crate::error::CompileError;
use crate::scratch::ScratchWorkspace;
use crate::unit::unit_path;

/// An annotation processor, as the classes it was compiled to.
#[derive(Clone, Debug)]
pub struct Transformer {
    /// Binary name of the class implementing `Processor`.
    pub class_name: String,
    /// Output of the compilation that produced it, helpers included.
    pub artifacts: CompiledArtifactSet,
}

/// Compiles single source units into fresh scratch workspaces.
///
/// Sources are looked up under `source_root` by unit name
/// (`com.example.Foo` -> `com/example/Foo.java`) unless given inline.
/// The compile classpath is the configured entries, then `source_root`,
/// then the invocation's own output directory.
pub struct CompileTestUtils {
    source_root: PathBuf,
    classpath: Vec<PathBuf>,
    backend: Arc<dyn CompilerBackend>,
}

impl CompileTestUtils {
    /// Wrap the system `javac` located per `config`.
    pub fn new(source_root: impl Into<PathBuf>, config: &CompileTestConfig) -> Result<Self, CompileError> {
        let backend = JavacBackend::detect(config)?;
        Ok(Self::with_backend(
            source_root,
            config.classpath.clone(),
            Arc::new(backend),
        ))
    }

    pub fn with_backend(
        source_root: impl Into<PathBuf>,
        classpath: Vec<PathBuf>,
        backend: Arc<dyn CompilerBackend>,
    ) -> Self {
        CompileTestUtils {
            source_root: source_root.into(),
            classpath,
            backend,
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// The configured classpath, without the per-invocation entries.
    pub fn classpath(&self) -> &[PathBuf] {
        &self.classpath
    }

    /// Compile `unit` from the source root with annotation processing off.
    pub fn compile(&self, unit: &str) -> Result<Option<CompiledArtifactSet>, CompileError> {
        self.compile_with_transformer(unit, None, None)
    }

    /// Compile `unit`, from `source` when given, with `transformer`
    /// attached when given.
    ///
    /// `Ok(None)` means the compiler reported errors or did not produce
    /// `unit`'s class file. The scratch workspace is deleted before
    /// returning either way.
    #[tracing::instrument(
        level = "debug",
        skip(self, source, transformer),
        fields(
            inline = source.is_some(),
            processor = transformer.map(|t| t.class_name.as_str()),
        )
    )]
    pub fn compile_with_transformer(
        &self,
        unit: &str,
        source: Option<&str>,
        transformer: Option<&Transformer>,
    ) -> Result<Option<CompiledArtifactSet>, CompileError> {
        let unit_file = unit_path(unit, "java")?;
        let scratch = ScratchWorkspace::create()?;
        let result = self.compile_in(&scratch, unit, &unit_file, source, transformer);
        match scratch.close() {
            Ok(()) => result,
            Err(close) if result.is_ok() => Err(close),
            Err(close) => {
                tracing::warn!(error = %close, "failed to delete scratch workspace");
                result
            }
        }
    }

    fn compile_in(
        &self,
        scratch: &ScratchWorkspace,
        unit: &str,
        unit_file: &Path,
        source: Option<&str>,
        transformer: Option<&Transformer>,
    ) -> Result<Option<CompiledArtifactSet>, CompileError> {
        let source_file = match source {
            Some(text) => scratch.write_source(unit, text)?,
            None => self.source_root.join(unit_file),
        };

        let processor_dir = scratch.processor_dir();
        if let Some(transformer) = transformer {
            transformer.artifacts.write_to(&processor_dir)?;
        }

        let classes_dir = scratch.classes_dir();
        let generated_dir = scratch.generated_dir();
        let mut classpath = self.classpath.clone();
        classpath.push(self.source_root.clone());
        classpath.push(classes_dir.clone());

        let request = CompileRequest {
            source_file: &source_file,
            classpath: &classpath,
            output_dir: &classes_dir,
            generated_dir: &generated_dir,
            processor: transformer.map(|t| ProcessorSpec {
                class_name: &t.class_name,
                path: &processor_dir,
            }),
        };
        let succeeded = self.backend.compile(&request)?;

        let primary = classes_dir.join(unit_file.with_extension("class"));
        if !succeeded || !primary.is_file() {
            tracing::debug!(succeeded, primary = %primary.display(), "no usable output");
            return Ok(None);
        }
        CompiledArtifactSet::collect(&classes_dir).map(Some)
    }
}
