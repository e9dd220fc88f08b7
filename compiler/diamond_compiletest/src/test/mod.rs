//! Running discovered cases and collecting their results.


pub use result::{TestOutcome, TestResult, TestSummary};
pub use runner::{TestRunner, TestRunnerConfig};
