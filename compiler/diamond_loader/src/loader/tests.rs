use std::sync::Arc;

use diamond_classfile::testing::ClassBuilder;
use pretty_assertions::assert_eq;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use super::*;
use crate::resolver::PlatformClasses;

/// Parent that knows a fixed set of definitions.
struct MapResolver(FxHashMap<String, Arc<LoadedClass>>);

impl ClassResolver for MapResolver {
    fn resolve(&self, name: &str) -> Result<Arc<LoadedClass>> {
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(name.to_string()))
    }
}

fn class_bytes(name: &str) -> Arc<[u8]> {
    ClassBuilder::new(name).build().unwrap().into()
}

fn loader(classes: &[(&str, Arc<[u8]>)]) -> IsolatedClassLoader {
    IsolatedClassLoader::new(
        classes.iter().map(|(n, b)| ((*n).to_string(), Arc::clone(b))),
        Arc::new(PlatformClasses::new()),
    )
}

#[test]
fn test_defines_from_own_table() {
    let loader = loader(&[("com.example.Example", class_bytes("com.example.Example"))]);
    let class = loader.load("com.example.Example").unwrap();
    assert_eq!(class.name, "com.example.Example");
    assert_eq!(class.super_name.as_deref(), Some("java.lang.Object"));
    assert_eq!(class.origin, ClassOrigin::Isolated);
    assert!(loader.owns("com.example.Example"));
    assert_eq!(loader.names().collect::<Vec<_>>(), vec!["com.example.Example"]);
}

#[test]
fn test_definition_is_cached() {
    let loader = loader(&[("com.example.Example", class_bytes("com.example.Example"))]);
    let first = loader.load("com.example.Example").unwrap();
    let second = loader.load("com.example.Example").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_own_table_shadows_parent() {
    let mut parent = FxHashMap::default();
    let stale = LoadedClass::from_bytes(
        &ClassBuilder::new("com.example.Example")
            .interface("java.io.Serializable")
            .build()
            .unwrap(),
        ClassOrigin::Platform,
    )
    .unwrap();
    parent.insert("com.example.Example".to_string(), Arc::new(stale));

    let loader = IsolatedClassLoader::new(
        [("com.example.Example".to_string(), class_bytes("com.example.Example"))],
        Arc::new(MapResolver(parent)),
    );
    let class = loader.load("com.example.Example").unwrap();
    assert_eq!(class.origin, ClassOrigin::Isolated);
    assert!(class.interfaces.is_empty());
}

#[test]
fn test_unknown_names_go_to_parent() {
    let loader = loader(&[]);
    let object = loader.load("java.lang.Object").unwrap();
    assert_eq!(object.origin, ClassOrigin::Platform);
    assert_eq!(
        loader.load("com.example.Missing").unwrap_err(),
        LoadError::NotFound("com.example.Missing".to_string())
    );
}

#[test]
fn test_mismatched_bytes_are_rejected() {
    let loader = loader(&[("com.example.Example", class_bytes("com.example.Other"))]);
    assert_eq!(
        loader.load("com.example.Example").unwrap_err(),
        LoadError::WrongName {
            expected: "com.example.Example".to_string(),
            found: "com.example.Other".to_string(),
        }
    );
}

#[test]
fn test_malformed_bytes_name_the_class() {
    let loader = loader(&[("com.example.Broken", Arc::from(&b"not a class"[..]))]);
    let err = loader.load("com.example.Broken").unwrap_err();
    assert!(matches!(err, LoadError::Malformed { ref name, .. } if name == "com.example.Broken"));
}

#[test]
fn test_concurrent_loads_share_one_definition() {
    let names = ["com.example.A", "com.example.B", "com.example.C"];
    let loader = loader(
        &names
            .iter()
            .map(|n| (*n, class_bytes(n)))
            .collect::<Vec<_>>(),
    );
    let loaded: Vec<_> = (0..256)
        .into_par_iter()
        .map(|i| {
            let name = names[i % names.len()];
            (name, loader.load(name).unwrap())
        })
        .collect();
    for name in names {
        let mut defs = loaded.iter().filter(|(n, _)| *n == name).map(|(_, c)| c);
        let first = defs.next().unwrap();
        assert!(defs.all(|c| Arc::ptr_eq(first, c)));
    }
}
