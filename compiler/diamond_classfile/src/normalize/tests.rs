use super::*;
use crate::access::AccessFlags;
use crate::error::ClassFileError;
use crate::testing::{Bytecode, ClassBuilder};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// `public class Sample` with one field, a constructor, and a method whose
/// line table and source file vary with the arguments.
fn sample(source_file: &str, first_line: u16, field: &str) -> Vec<u8> {
    ClassBuilder::new("com.example.Sample")
        .field(AccessFlags::PRIVATE, field, "I")
        .default_constructor()
        .method(AccessFlags::PUBLIC, "greet", "()Ljava/lang/String;", |pool| {
            let s = pool.string("hello")?;
            let s = u8::try_from(s).map_err(|_| ClassFileError::PoolOverflow("ldc"))?;
            Ok(Bytecode::new(1, 1, vec![0x12, s, 0xb0])
                .with_lines(&[(0, first_line), (2, first_line + 1)]))
        })
        .source_file(source_file)
        .build()
        .unwrap()
}

fn attribute_names(class: &ClassFile, attrs: &[Attribute]) -> Vec<String> {
    attrs
        .iter()
        .map(|a| a.name(&class.constant_pool).unwrap().into_owned())
        .collect()
}

#[test]
fn test_debug_attributes_are_removed() {
    let normalized = normalize(&sample("Sample.java", 3, "count")).unwrap();
    let class = ClassFile::parse(&normalized).unwrap();

    assert!(attribute_names(&class, &class.attributes).is_empty());
    for method in &class.methods {
        assert_eq!(attribute_names(&class, &method.attributes), vec!["Code"]);
        for attr in &method.attributes {
            if let AttributeBody::Code(code) = &attr.body {
                assert!(code.attributes.is_empty());
            }
        }
    }
    let strings: Vec<_> = class
        .constant_pool
        .iter()
        .filter_map(|(i, _)| class.constant_pool.utf8(i).ok())
        .collect();
    assert!(!strings.iter().any(|s| s == "Sample.java"));
    assert!(!strings.iter().any(|s| s == "LineNumberTable"));
}

#[test]
fn test_layout_differences_normalize_equal() {
    let a = normalize(&sample("Sample.java", 3, "count")).unwrap();
    let b = normalize(&sample("Other.java", 40, "count")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_structural_difference_survives() {
    let a = normalize(&sample("Sample.java", 3, "count")).unwrap();
    let b = normalize(&sample("Sample.java", 3, "total")).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_unreferenced_constants_are_dropped() {
    let noisy = ClassBuilder::new("com.example.Noisy")
        .method(AccessFlags::PUBLIC, "run", "()V", |pool| {
            pool.utf8("never referenced")?;
            Ok(Bytecode::new(0, 1, vec![0xb1]))
        })
        .build()
        .unwrap();
    let quiet = ClassBuilder::new("com.example.Noisy")
        .method(AccessFlags::PUBLIC, "run", "()V", |_| {
            Ok(Bytecode::new(0, 1, vec![0xb1]))
        })
        .build()
        .unwrap();
    assert_ne!(noisy, quiet);
    assert_eq!(normalize(&noisy).unwrap(), normalize(&quiet).unwrap());
}

#[test]
fn test_pool_order_does_not_leak_into_output() {
    let forward = ClassBuilder::new("com.example.Order")
        .field(AccessFlags::PUBLIC, "alpha", "J")
        .field(AccessFlags::PUBLIC, "beta", "D")
        .build()
        .unwrap();
    // Same members, but the pool lists their names in a different order.
    let mut shuffled = ClassBuilder::new("com.example.Order")
        .method(AccessFlags::PUBLIC, "scratch", "()V", |pool| {
            pool.utf8("D")?;
            pool.utf8("beta")?;
            pool.utf8("J")?;
            Ok(Bytecode::new(0, 1, vec![0xb1]))
        })
        .field(AccessFlags::PUBLIC, "alpha", "J")
        .field(AccessFlags::PUBLIC, "beta", "D")
        .build_class()
        .unwrap();
    shuffled.methods.clear();
    let shuffled = shuffled.to_bytes().unwrap();

    assert_ne!(forward, shuffled);
    assert_eq!(normalize(&forward).unwrap(), normalize(&shuffled).unwrap());
}

#[test]
fn test_ldc_constants_are_placed_first() {
    // Field names outnumber the one-byte `ldc` range, so the string only
    // stays loadable if it is interned before them.
    let mut builder = ClassBuilder::new("com.example.Wide").string_method("label", "late");
    for i in 0..300 {
        builder = builder.field(AccessFlags::PUBLIC, &format!("f{i}"), "I");
    }
    let bytes = builder.build().unwrap();
    let class = ClassFile::parse(&normalize(&bytes).unwrap()).unwrap();

    let method = &class.methods[0];
    let AttributeBody::Code(code) = &method.attributes[0].body else {
        panic!("expected Code attribute");
    };
    assert_eq!(code.code[0], 0x12);
    let index = u16::from(code.code[1]);
    assert_eq!(
        class.constant_pool.get(index).unwrap(),
        &Constant::String(1),
    );
    assert_eq!(class.constant_pool.utf8(1).unwrap(), "late");
}

#[test]
fn test_bytecode_operands_follow_the_new_pool() {
    let bytes = ClassBuilder::new("com.example.Init")
        .default_constructor()
        .build()
        .unwrap();
    let class = ClassFile::parse(&normalize(&bytes).unwrap()).unwrap();
    let AttributeBody::Code(code) = &class.methods[0].attributes[0].body else {
        panic!("expected Code attribute");
    };
    let index = u16::from_be_bytes([code.code[2], code.code[3]]);
    let Constant::MethodRef {
        class: owner,
        name_and_type,
    } = class.constant_pool.get(index).unwrap()
    else {
        panic!("expected MethodRef");
    };
    assert_eq!(
        class.constant_pool.class_name(*owner).unwrap(),
        "java/lang/Object"
    );
    assert_eq!(
        class.constant_pool.name_and_type(*name_and_type).unwrap(),
        ("<init>".to_string(), "()V".to_string())
    );
}

#[test]
fn test_object_keeps_empty_super() {
    let bytes = ClassBuilder::new("java.lang.Object")
        .super_class(None)
        .build()
        .unwrap();
    let class = ClassFile::parse(&normalize(&bytes).unwrap()).unwrap();
    assert_eq!(class.super_class, 0);
}

#[test]
fn test_garbage_is_rejected() {
    assert_eq!(
        normalize(b"\x00\x01\x02\x03 not a class"),
        Err(ClassFileError::BadMagic(0x0001_0203))
    );
    assert!(matches!(
        normalize(&[0xCA, 0xFE, 0xBA, 0xBE, 0x00]),
        Err(ClassFileError::Truncated { .. })
    ));
}

proptest! {
    #[test]
    fn normalize_is_idempotent(
        source in "[A-Z][a-z]{0,8}\\.java",
        line in 1u16..5000,
        field in "[a-z][a-z0-9]{0,10}",
    ) {
        let once = normalize(&sample(&source, line, &field)).unwrap();
        let twice = normalize(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn line_tables_never_affect_output(
        a in 1u16..5000,
        b in 1u16..5000,
        source_a in "[A-Z][a-z]{0,8}\\.java",
        source_b in "[A-Z][a-z]{0,8}\\.java",
    ) {
        let left = normalize(&sample(&source_a, a, "value")).unwrap();
        let right = normalize(&sample(&source_b, b, "value")).unwrap();
        prop_assert_eq!(left, right);
    }
}
