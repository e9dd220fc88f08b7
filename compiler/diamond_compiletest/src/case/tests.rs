use diamond_classfile::testing::ClassBuilder;
use diamond_classfile::AccessFlags;
use pretty_assertions::assert_eq;

use super::*;
use crate::artifacts::CompiledArtifactSet;
use crate::testing::ScriptedBackend;

const STUB: &str = "import a.Mark;\npublic class Example {\n    @a.Mark\n    public int example;\n}";
const EXPECTED: &str = "public class Example {\n    public int example = 1;\n}";

/// `Example` with an int field, compiled "from" `source_file`.
fn example(source_file: &str) -> Vec<u8> {
    ClassBuilder::new("Example")
        .field(AccessFlags::PUBLIC, "example", "I")
        .default_constructor()
        .source_file(source_file)
        .build()
        .unwrap()
}

fn case(backend: ScriptedBackend, expected: &str) -> CompileTestCase {
    let root = std::env::temp_dir();
    let utils = CompileTestUtils::with_backend(root, Vec::new(), Arc::new(backend));
    CompileTestCase::new(
        "p.Gen".to_string(),
        CasePlan::Compare {
            utils: Arc::new(utils),
            transformer: Transformer {
                class_name: "p.Gen".to_string(),
                artifacts: CompiledArtifactSet::default(),
            },
            stub: STUB.to_string(),
            expected: expected.to_string(),
        },
    )
}

#[test]
fn test_missing_expected_fails_when_run() {
    let case = CompileTestCase::new("p.Gen".to_string(), CasePlan::MissingExpected);
    let err = case.run().unwrap_err();
    assert_eq!(err, CaseFailure::MissingExpected);
    assert_eq!(
        err.to_string(),
        "Either one of `expected` or `expectedFile` must be set!"
    );
}

#[test]
fn test_debug_only_differences_pass() {
    let backend = ScriptedBackend::new()
        .processor("p.Gen", vec![("Example".into(), example("Generated.java"))])
        .source(EXPECTED, vec![("Example".into(), example("Example.java"))]);
    case(backend, EXPECTED).run().unwrap();
}

#[test]
fn test_missing_member_is_a_mismatch() {
    let with_extra = ClassBuilder::new("Example")
        .field(AccessFlags::PUBLIC, "example", "I")
        .default_constructor()
        .string_method("extra", "x")
        .build()
        .unwrap();
    let backend = ScriptedBackend::new()
        .processor("p.Gen", vec![("Example".into(), example("Example.java"))])
        .source(EXPECTED, vec![("Example".into(), with_extra)]);
    let err = case(backend, EXPECTED).run().unwrap_err();
    let CaseFailure::Mismatch {
        case,
        only_in_generated,
        only_in_expected,
        generated_len,
        expected_len,
        ..
    } = &err
    else {
        panic!("expected a mismatch, got {err:?}");
    };
    assert_eq!(case, "p.Gen");
    assert!(only_in_generated.is_empty());
    assert_eq!(only_in_expected, &vec!["method extra()Ljava/lang/String;".to_string()]);
    assert!(generated_len < expected_len);
    assert!(err.to_string().starts_with("p.Gen: normalized class files differ"));
    assert!(err.to_string().ends_with("only in expected: method extra()Ljava/lang/String;"));
}

#[test]
fn test_changed_field_type_is_a_mismatch() {
    let long_field = ClassBuilder::new("Example")
        .field(AccessFlags::PUBLIC, "example", "J")
        .default_constructor()
        .build()
        .unwrap();
    let backend = ScriptedBackend::new()
        .processor("p.Gen", vec![("Example".into(), long_field)])
        .source(EXPECTED, vec![("Example".into(), example("Example.java"))]);
    let err = case(backend, EXPECTED).run().unwrap_err();
    let CaseFailure::Mismatch {
        only_in_generated,
        only_in_expected,
        first_difference,
        ..
    } = err
    else {
        panic!("expected a mismatch");
    };
    assert_eq!(only_in_generated, vec!["field example:J".to_string()]);
    assert_eq!(only_in_expected, vec!["field example:I".to_string()]);
    assert!(first_difference.is_some());
}

#[test]
fn test_processor_side_compile_failure() {
    let backend = ScriptedBackend::new()
        .source(EXPECTED, vec![("Example".into(), example("Example.java"))]);
    let err = case(backend, EXPECTED).run().unwrap_err();
    assert_eq!(err, CaseFailure::Compile { side: Side::Generated });
    assert_eq!(err.to_string(), "Could not compile Example (with annotation processor)");
}

#[test]
fn test_expected_side_compile_failure() {
    let backend = ScriptedBackend::new()
        .processor("p.Gen", vec![("Example".into(), example("Example.java"))]);
    let err = case(backend, "public class Example { broken").run().unwrap_err();
    assert_eq!(err, CaseFailure::Compile { side: Side::Expected });
    assert_eq!(err.to_string(), "Could not compile Example (no annotation processor)");
}

#[test]
fn test_unreadable_output_is_a_normalize_failure() {
    let backend = ScriptedBackend::new()
        .processor("p.Gen", vec![("Example".into(), b"not a class".to_vec())])
        .source(EXPECTED, vec![("Example".into(), example("Example.java"))]);
    let err = case(backend, EXPECTED).run().unwrap_err();
    assert!(matches!(
        err,
        CaseFailure::Normalize {
            side: Side::Generated,
            ..
        }
    ));
}

#[test]
fn test_cases_can_run_repeatedly() {
    let backend = ScriptedBackend::new()
        .processor("p.Gen", vec![("Example".into(), example("A.java"))])
        .source(EXPECTED, vec![("Example".into(), example("B.java"))]);
    let case = case(backend, EXPECTED);
    case.run().unwrap();
    case.run().unwrap();
    assert_eq!(case.name(), "p.Gen");
}
