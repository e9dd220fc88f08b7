//! Compile-test harness for Java annotation processors.
//!
//! Discovers processors marked with `@ProcessorTest` under a source tree,
//! and turns each into a case that compiles a marked stub with the
//! processor attached, compiles the declared expected source without it,
//! and compares the two `Example` classes with debug information removed.
//!
//! # Layout
//!
//! - [`CompileTestUtils`]: one compilation per call, each in a fresh
//!   [`ScratchWorkspace`], through a [`CompilerBackend`]
//! - [`discover`]: lazy iterator of [`CompileTestCase`]s
//! - [`test`]: runner and result types behind the `diamond` binary

mod artifacts;
mod backend;
mod case;
mod config;
mod discovery;
mod error;
mod scratch;
pub mod test;
#[cfg(test)]
pub(crate) mod testing;
mod unit;
mod utils;

use std::sync::Once;

pub use artifacts::{Artifact, CompiledArtifactSet};
pub use backend::{
    CompileRequest, CompilerBackend, JavacBackend, JavacVersion, ProcessorSpec, REQUIRED_EXPORTS,
};
pub use case::{CaseFailure, CasePlan, CompileTestCase, Side};
pub use config::{CompileTestConfig, JAVAC_ENV};
pub use discovery::{
    discover, stub_source, DiscoveredCases, ExpectedSource, TargetKind, TestDeclaration,
    DEFAULT_MARKER, EXAMPLE_CLASS, PROCESSOR_TEST_DESCRIPTOR,
};
pub use error::{CompileError, DiscoveryError};
pub use scratch::ScratchWorkspace;
pub use test::{TestOutcome, TestResult, TestRunner, TestRunnerConfig, TestSummary};
pub use unit::{unit_name, unit_path};
pub use utils::{CompileTestUtils, Transformer};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for diagnostic output on stderr.
///
/// Call this once at startup. Safe to call multiple times.
/// With `RUST_LOG` set, its filter applies (`RUST_LOG=diamond_loader=trace`).
/// Otherwise `verbose` enables an indented span tree of the harness's
/// debug events; without either nothing is installed.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let installed = if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(EnvFilter::from_default_env())
                .try_init()
        } else if verbose {
            let filter = EnvFilter::new("diamond_compiletest=debug,diamond_loader=debug");
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_writer(std::io::stderr)
                        .with_targets(true),
                )
                .with(filter)
                .try_init()
        } else {
            Ok(())
        };
        if let Err(e) = installed {
            eprintln!("warning: tracing not initialized: {e}");
        }
    });
}
