//! Command handlers for the `diamond` CLI.

mod test;

pub use test::{run_tests, TestArgs};
