use super::*;

#[test]
fn test_outcome_predicates() {
    assert!(TestOutcome::Passed.is_passed());
    assert!(!TestOutcome::Passed.is_failed());
    assert!(TestOutcome::Failed("error".into()).is_failed());
    assert!(TestOutcome::Skipped("reason".into()).is_skipped());
}

#[test]
fn test_summary_counts() {
    let mut summary = TestSummary::new();
    summary.add_result(TestResult::passed("a.A".into(), Duration::from_millis(10)));
    summary.add_result(TestResult::failed(
        "b.B".into(),
        "Could not compile Example (with annotation processor)".into(),
        Duration::from_millis(5),
    ));
    summary.add_result(TestResult::skipped("c.C".into(), "filtered".into()));

    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.total(), 3);
    assert!(summary.has_failures());
    let names: Vec<_> = summary.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["a.A", "b.B", "c.C"]);
}

#[test]
fn test_summary_exit_code() {
    let mut summary = TestSummary::new();
    assert_eq!(summary.exit_code(), 2); // No tests

    summary.passed = 1;
    assert_eq!(summary.exit_code(), 0); // All pass

    summary.failed = 1;
    assert_eq!(summary.exit_code(), 1); // Failures
}

#[test]
fn test_only_skipped_is_not_empty() {
    let mut summary = TestSummary::new();
    summary.add_result(TestResult::skipped("a.A".into(), "filtered".into()));
    assert_eq!(summary.exit_code(), 0);
}
