//! The `test` command: discover and run processor tests, report results.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use diamond_compiletest::{
    CompileTestConfig, CompileTestUtils, TestOutcome, TestRunner, TestRunnerConfig, TestSummary,
};

/// Exit code when the run could not start or discovery aborted.
const SETUP_FAILURE: i32 = 3;

#[derive(Args, Debug)]
pub struct TestArgs {
    /// Source tree to scan for processor tests
    pub scan_root: PathBuf,

    /// Directory or jar to put on the compile classpath (repeatable)
    #[arg(long = "classpath", value_name = "PATH")]
    pub classpath: Vec<PathBuf>,

    /// javac executable (default: `$DIAMOND_JAVAC`, `$JAVA_HOME/bin/javac`, javac)
    #[arg(long, value_name = "PATH")]
    pub javac: Option<PathBuf>,

    /// Only run cases whose name contains this
    #[arg(long, value_name = "SUBSTR")]
    pub filter: Option<String>,

    /// Run cases one at a time
    #[arg(long)]
    pub no_parallel: bool,

    /// Report every case and trace the harness
    #[arg(short, long)]
    pub verbose: bool,

    /// Extra option passed to every javac invocation (repeatable)
    #[arg(long = "javac-option", value_name = "OPT", allow_hyphen_values = true)]
    pub javac_options: Vec<String>,
}

/// Run the processor tests under `args.scan_root` and exit.
pub fn run_tests(args: &TestArgs) -> ! {
    diamond_compiletest::init_tracing(args.verbose);

    let mut config = CompileTestConfig::from_env();
    if args.javac.is_some() {
        config.javac.clone_from(&args.javac);
    }
    config.classpath.clone_from(&args.classpath);
    config.extra_options.clone_from(&args.javac_options);

    let utils = match CompileTestUtils::new(&args.scan_root, &config) {
        Ok(utils) => Arc::new(utils),
        Err(e) => exit_with_error(&e),
    };

    let runner = TestRunner::with_config(TestRunnerConfig {
        filter: args.filter.clone(),
        verbose: args.verbose,
        parallel: !args.no_parallel,
    });
    match runner.run(&args.scan_root, utils) {
        Ok(summary) => {
            print_test_summary(&summary, runner.config().verbose);
            std::process::exit(summary.exit_code());
        }
        Err(e) => exit_with_error(&e),
    }
}

fn exit_with_error(error: &dyn Error) -> ! {
    eprintln!("error: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
    std::process::exit(SETUP_FAILURE);
}

/// Print a summary of test results, with optional verbose output.
fn print_test_summary(summary: &TestSummary, verbose: bool) {
    for result in &summary.results {
        let status = match &result.outcome {
            TestOutcome::Passed => {
                if verbose {
                    format!("  PASS: {} ({:.2?})", result.name, result.duration)
                } else {
                    continue;
                }
            }
            TestOutcome::Failed(msg) => {
                format!("  FAIL: {} - {}", result.name, msg)
            }
            TestOutcome::Skipped(reason) => {
                if verbose {
                    format!("  SKIP: {} - {}", result.name, reason)
                } else {
                    continue;
                }
            }
        };
        println!("{status}");
    }

    println!();
    println!("Test Summary:");
    println!(
        "  {} passed, {} failed, {} skipped ({} total)",
        summary.passed,
        summary.failed,
        summary.skipped,
        summary.total()
    );
    println!("  Completed in {:.2?}", summary.duration);

    if summary.has_failures() {
        println!();
        println!("FAILED");
    } else if summary.total() == 0 {
        println!();
        println!("NO TESTS FOUND");
    } else {
        println!();
        println!("OK");
    }
}
