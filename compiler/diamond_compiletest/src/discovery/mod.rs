//! Case discovery.
//!
//! Walks a source tree, compiles every `.java` file, and turns each
//! annotation processor carrying a `@ProcessorTest` declaration into a
//! [`CompileTestCase`]. The per-file work happens as the returned
//! iterator is pulled; no case runs until the caller runs it.

mod declaration;
mod stub;

use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use diamond_loader::{
    implements, ClassResolver, ClasspathResolver, IsolatedClassLoader, LoadError,
    PROCESSOR_INTERFACE,
};
use walkdir::WalkDir;

use crate::case::{CasePlan, CompileTestCase};
use crate::error::{CompileError, DiscoveryError};
use crate::unit::unit_name;
use crate::utils::{CompileTestUtils, Transformer};

pub use declaration::{
    ExpectedSource, TargetKind, TestDeclaration, DEFAULT_MARKER, PROCESSOR_TEST_DESCRIPTOR,
};
pub use stub::{stub_source, EXAMPLE_CLASS};

/// Discover the processor tests under `scan_root`.
///
/// Fails immediately when `scan_root` is not a directory or the
/// classpath cannot be opened. Every other fault is yielded by the
/// iterator, after which it is exhausted.
#[tracing::instrument(level = "debug", skip_all, fields(scan_root = %scan_root.display()))]
pub fn discover(
    scan_root: &Path,
    utils: Arc<CompileTestUtils>,
) -> Result<DiscoveredCases, DiscoveryError> {
    if !scan_root.is_dir() {
        return Err(DiscoveryError::InvalidScanRoot(scan_root.to_path_buf()));
    }
    let parent = ClasspathResolver::new(utils.classpath()).map_err(DiscoveryError::Classpath)?;
    Ok(DiscoveredCases {
        walker: WalkDir::new(scan_root).sort_by_file_name().into_iter(),
        scan_root: scan_root.to_path_buf(),
        utils,
        parent: Arc::new(parent),
        finished: false,
    })
}

/// Lazily discovered cases, in file name order.
///
/// Single-pass: after the walk ends or a fault is yielded, `next`
/// returns `None`.
pub struct DiscoveredCases {
    walker: walkdir::IntoIter,
    scan_root: PathBuf,
    utils: Arc<CompileTestUtils>,
    parent: Arc<dyn ClassResolver>,
    finished: bool,
}

impl Iterator for DiscoveredCases {
    type Item = Result<CompileTestCase, DiscoveryError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let Some(entry) = self.walker.next() else {
                self.finished = true;
                break;
            };
            let path = match entry {
                Ok(entry) => entry.into_path(),
                Err(e) => return self.fail(walk_error(&self.scan_root, &e)),
            };
            if path.extension().is_none_or(|e| e != "java") || !path.is_file() {
                continue;
            }
            match self.examine(&path) {
                Ok(Some(case)) => return Some(Ok(case)),
                Ok(None) => {}
                Err(e) => return self.fail(e),
            }
        }
        None
    }
}

impl FusedIterator for DiscoveredCases {}

impl DiscoveredCases {
    fn fail(&mut self, error: DiscoveryError) -> Option<Result<CompileTestCase, DiscoveryError>> {
        self.finished = true;
        Some(Err(error))
    }

    /// Compile one file and, when it is a declared processor test, build
    /// its case.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %path.display()))]
    fn examine(&self, path: &Path) -> Result<Option<CompileTestCase>, DiscoveryError> {
        let relative = path.strip_prefix(&self.scan_root).unwrap_or(path);
        let unit = unit_name(relative, "java")
            .ok_or_else(|| CompileError::InvalidUnitName(relative.display().to_string()))?;
        let source = std::fs::read_to_string(path).map_err(|e| io_error(path, &e))?;

        let Some(artifacts) = self.utils.compile_with_transformer(&unit, Some(&source), None)? else {
            return Err(DiscoveryError::Compiler { unit });
        };

        let loader = IsolatedClassLoader::new(artifacts.classes(), Arc::clone(&self.parent));
        let load_error = |source: LoadError| DiscoveryError::Load {
            unit: unit.clone(),
            source,
        };
        let class = loader.load(&unit).map_err(load_error)?;
        if !implements(&class, PROCESSOR_INTERFACE, &loader).map_err(load_error)? {
            tracing::trace!(unit = %unit, "not a processor");
            return Ok(None);
        }
        let Some(annotation) = class.annotation(PROCESSOR_TEST_DESCRIPTOR) else {
            tracing::trace!(unit = %unit, "processor without a test declaration");
            return Ok(None);
        };

        let declaration = TestDeclaration::from_annotation(&unit, annotation)?;
        let marker = loader.load(&declaration.marker).map_err(load_error)?;
        if !marker.is_annotation() {
            return Err(DiscoveryError::Unsupported {
                unit,
                reason: declaration::NOT_AN_ANNOTATION.to_string(),
            });
        }

        let expected = match &declaration.expected {
            ExpectedSource::File(file) => Some(self.read_expected(file)?),
            ExpectedSource::Inline(lines) => Some(lines.join("\n")),
            ExpectedSource::Missing => None,
        };
        let plan = match expected {
            Some(expected) => CasePlan::Compare {
                utils: Arc::clone(&self.utils),
                transformer: Transformer {
                    class_name: unit.clone(),
                    artifacts,
                },
                stub: stub_source(declaration.target, &declaration.marker),
                expected,
            },
            None => {
                tracing::warn!(unit = %unit, "processor test has no expected source");
                CasePlan::MissingExpected
            }
        };
        tracing::debug!(unit = %unit, target = %declaration.target, marker = %declaration.marker, "discovered case");
        Ok(Some(CompileTestCase::new(unit, plan)))
    }

    /// Read an expected-source file relative to the scan root, line
    /// endings normalized to `\n` and without a trailing newline.
    fn read_expected(&self, file: &Path) -> Result<String, DiscoveryError> {
        let path = self.scan_root.join(file);
        let text = std::fs::read_to_string(&path).map_err(|e| io_error(&path, &e))?;
        Ok(text.lines().collect::<Vec<_>>().join("\n"))
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> DiscoveryError {
    DiscoveryError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn walk_error(root: &Path, err: &walkdir::Error) -> DiscoveryError {
    DiscoveryError::Io {
        path: err.path().unwrap_or(root).to_path_buf(),
        message: err.to_string(),
    }
}
