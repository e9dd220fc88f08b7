//! A runnable compile-and-compare test case.

use std::fmt;
use std::sync::Arc;

use diamond_classfile::{normalize, ClassFile, ClassFileError};
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::discovery::EXAMPLE_CLASS;
use crate::error::CompileError;
use crate::utils::{CompileTestUtils, Transformer};

/// Which of a case's two compilations something refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// The stub, compiled with the processor attached.
    Generated,
    /// The expected source, compiled plainly.
    Expected,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Generated => write!(f, "{EXAMPLE_CLASS} (with annotation processor)"),
            Side::Expected => write!(f, "{EXAMPLE_CLASS} (no annotation processor)"),
        }
    }
}

/// Why a case failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseFailure {
    #[error("Either one of `expected` or `expectedFile` must be set!")]
    MissingExpected,

    #[error("Could not compile {side}")]
    Compile { side: Side },

    #[error("{side} produced no class {unit}")]
    MissingArtifact { side: Side, unit: String },

    #[error(
        "{case}: normalized class files differ (generated {generated_len} bytes, \
         expected {expected_len} bytes{}){}{}",
        .first_difference.map(|at| format!(", first difference at byte {at}")).unwrap_or_default(),
        member_list("only in generated", .only_in_generated),
        member_list("only in expected", .only_in_expected),
    )]
    Mismatch {
        case: String,
        generated_len: usize,
        expected_len: usize,
        /// `None` when one output is a prefix of the other.
        first_difference: Option<usize>,
        only_in_generated: Vec<String>,
        only_in_expected: Vec<String>,
    },

    #[error("cannot normalize output of {side}: {source}")]
    Normalize {
        side: Side,
        #[source]
        source: ClassFileError,
    },

    #[error("while compiling {side}: {source}")]
    Io {
        side: Side,
        #[source]
        source: CompileError,
    },
}

fn member_list(label: &str, members: &[String]) -> String {
    if members.is_empty() {
        String::new()
    } else {
        format!("; {label}: {}", members.join(", "))
    }
}

/// What running a case does.
pub enum CasePlan {
    /// Compile the stub with the processor and the expected source
    /// without, then compare the normalized `Example` classes.
    Compare {
        utils: Arc<CompileTestUtils>,
        transformer: Transformer,
        stub: String,
        expected: String,
    },
    /// The declaration gave no expected source.
    MissingExpected,
}

/// One discovered case, named after its processor.
pub struct CompileTestCase {
    name: String,
    plan: CasePlan,
}

impl CompileTestCase {
    pub fn new(name: String, plan: CasePlan) -> Self {
        CompileTestCase { name, plan }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plan(&self) -> &CasePlan {
        &self.plan
    }

    /// Run the case. Each run compiles in fresh scratch workspaces, so a
    /// case may be run repeatedly and cases may run concurrently.
    #[tracing::instrument(level = "debug", skip_all, fields(case = %self.name))]
    pub fn run(&self) -> Result<(), CaseFailure> {
        let CasePlan::Compare {
            utils,
            transformer,
            stub,
            expected,
        } = &self.plan
        else {
            return Err(CaseFailure::MissingExpected);
        };

        let generated = compile_side(utils, Side::Generated, stub, Some(transformer))?;
        let expected = compile_side(utils, Side::Expected, expected, None)?;
        let generated = normalize(&generated).map_err(|source| CaseFailure::Normalize {
            side: Side::Generated,
            source,
        })?;
        let expected = normalize(&expected).map_err(|source| CaseFailure::Normalize {
            side: Side::Expected,
            source,
        })?;

        if generated == expected {
            return Ok(());
        }
        Err(mismatch(&self.name, &generated, &expected))
    }
}

impl fmt::Debug for CompileTestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = match self.plan {
            CasePlan::Compare { .. } => "Compare",
            CasePlan::MissingExpected => "MissingExpected",
        };
        f.debug_struct("CompileTestCase")
            .field("name", &self.name)
            .field("plan", &plan)
            .finish()
    }
}

/// The `Example` class from compiling `source`.
fn compile_side(
    utils: &CompileTestUtils,
    side: Side,
    source: &str,
    transformer: Option<&Transformer>,
) -> Result<Arc<[u8]>, CaseFailure> {
    let artifacts = utils
        .compile_with_transformer(EXAMPLE_CLASS, Some(source), transformer)
        .map_err(|source| CaseFailure::Io { side, source })?
        .ok_or(CaseFailure::Compile { side })?;
    artifacts
        .get(EXAMPLE_CLASS)
        .map(|a| Arc::clone(&a.bytes))
        .ok_or_else(|| CaseFailure::MissingArtifact {
            side,
            unit: EXAMPLE_CLASS.to_string(),
        })
}

fn mismatch(case: &str, generated: &[u8], expected: &[u8]) -> CaseFailure {
    let first_difference = generated
        .iter()
        .zip(expected)
        .position(|(g, e)| g != e);
    let generated_members = members(generated);
    let expected_members = members(expected);
    let only = |a: &[String], b: &[String]| -> Vec<String> {
        let b: FxHashSet<&String> = b.iter().collect();
        a.iter().filter(|m| !b.contains(m)).cloned().collect()
    };
    CaseFailure::Mismatch {
        case: case.to_string(),
        generated_len: generated.len(),
        expected_len: expected.len(),
        first_difference,
        only_in_generated: only(&generated_members, &expected_members),
        only_in_expected: only(&expected_members, &generated_members),
    }
}

/// `field name:descriptor` / `method name descriptor` for every member.
fn members(bytes: &[u8]) -> Vec<String> {
    let Ok(class) = ClassFile::parse(bytes) else {
        return Vec::new();
    };
    let fields = class.field_signatures().unwrap_or_default();
    let methods = class.method_signatures().unwrap_or_default();
    fields
        .into_iter()
        .map(|(name, desc)| format!("field {name}:{desc}"))
        .chain(
            methods
                .into_iter()
                .map(|(name, desc)| format!("method {name}{desc}")),
        )
        .collect()
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
