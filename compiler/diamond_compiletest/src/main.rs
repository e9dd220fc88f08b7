//! Diamond CLI
//!
//! Runs the `@ProcessorTest` cases of a source tree against the system `javac`.

mod commands;

use clap::{Parser, Subcommand};

use commands::{run_tests, TestArgs};

#[derive(Parser)]
#[command(name = "diamond")]
#[command(about = "Compile-test harness for Java annotation processors")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Discover and run processor tests under a source tree
    Test(TestArgs),
}

fn main() {
    match Cli::parse().command {
        Command::Test(args) => run_tests(&args),
    }
}
