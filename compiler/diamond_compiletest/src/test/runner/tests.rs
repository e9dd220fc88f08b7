use std::sync::Arc;

use diamond_classfile::testing::ClassBuilder;
use pretty_assertions::assert_eq;

use super::*;
use crate::artifacts::CompiledArtifactSet;
use crate::case::CasePlan;
use crate::test::TestOutcome;
use crate::testing::ScriptedBackend;
use crate::utils::Transformer;

const EXPECTED: &str = "public class Example {}";

fn passing_case(name: &str) -> CompileTestCase {
    let example = ClassBuilder::new("Example").default_constructor().build().unwrap();
    let backend = ScriptedBackend::new()
        .processor(name, vec![("Example".into(), example.clone())])
        .source(EXPECTED, vec![("Example".into(), example)]);
    let utils = CompileTestUtils::with_backend(std::env::temp_dir(), Vec::new(), Arc::new(backend));
    CompileTestCase::new(
        name.to_string(),
        CasePlan::Compare {
            utils: Arc::new(utils),
            transformer: Transformer {
                class_name: name.to_string(),
                artifacts: CompiledArtifactSet::default(),
            },
            stub: "public class Example {}".to_string(),
            expected: EXPECTED.to_string(),
        },
    )
}

fn failing_case(name: &str) -> CompileTestCase {
    CompileTestCase::new(name.to_string(), CasePlan::MissingExpected)
}

fn outcomes(summary: &TestSummary) -> Vec<(&str, &TestOutcome)> {
    summary
        .results
        .iter()
        .map(|r| (r.name.as_str(), &r.outcome))
        .collect()
}

#[test]
fn test_runner_defaults() {
    let runner = TestRunner::new();
    assert!(runner.config().parallel);
    assert!(runner.config().filter.is_none());
}

#[test]
fn test_runner_no_cases() {
    let summary = TestRunner::new().run_cases(&[]);
    assert_eq!(summary.total(), 0);
    assert_eq!(summary.exit_code(), 2);
}

#[test]
fn test_runner_mixed_results() {
    let cases = [passing_case("a.Good"), failing_case("b.Bad")];
    for parallel in [false, true] {
        let runner = TestRunner::with_config(TestRunnerConfig {
            parallel,
            ..TestRunnerConfig::default()
        });
        let summary = runner.run_cases(&cases);
        assert_eq!(
            outcomes(&summary),
            vec![
                ("a.Good", &TestOutcome::Passed),
                (
                    "b.Bad",
                    &TestOutcome::Failed(
                        "Either one of `expected` or `expectedFile` must be set!".to_string()
                    )
                ),
            ]
        );
        assert_eq!(summary.exit_code(), 1);
    }
}

#[test]
fn test_runner_filter() {
    let cases = [passing_case("com.example.Wanted"), failing_case("com.example.Other")];
    let runner = TestRunner::with_config(TestRunnerConfig {
        filter: Some("Wanted".to_string()),
        ..TestRunnerConfig::default()
    });
    let summary = runner.run_cases(&cases);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert!(summary.results[1].outcome.is_skipped());
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn test_parallel_keeps_order() {
    let cases: Vec<_> = (0..8).map(|i| passing_case(&format!("p.Gen{i}"))).collect();
    let summary = TestRunner::new().run_cases(&cases);
    let names: Vec<_> = summary.results.iter().map(|r| r.name.clone()).collect();
    let expected: Vec<_> = (0..8).map(|i| format!("p.Gen{i}")).collect();
    assert_eq!(names, expected);
    assert_eq!(summary.passed, 8);
}

#[test]
fn test_run_rejects_missing_scan_root() {
    let dir = tempfile::tempdir().unwrap();
    let utils = Arc::new(CompileTestUtils::with_backend(
        dir.path(),
        Vec::new(),
        Arc::new(ScriptedBackend::new()),
    ));
    let missing = dir.path().join("absent");
    let err = TestRunner::new().run(&missing, utils).unwrap_err();
    assert!(matches!(err, DiscoveryError::InvalidScanRoot(p) if p == missing));
}

#[test]
fn test_run_on_empty_tree() {
    let dir = tempfile::tempdir().unwrap();
    let utils = Arc::new(CompileTestUtils::with_backend(
        dir.path(),
        Vec::new(),
        Arc::new(ScriptedBackend::new()),
    ));
    let summary = TestRunner::new().run(dir.path(), utils).unwrap();
    assert_eq!(summary.exit_code(), 2);
}
