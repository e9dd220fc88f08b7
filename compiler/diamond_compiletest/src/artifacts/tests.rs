use super::*;
use pretty_assertions::assert_eq;

fn tree(files: &[(&str, &[u8])]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, bytes) in files {
        let path = dir.path().join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }
    dir
}

#[test]
fn test_collects_every_file_by_dotted_name() {
    let dir = tree(&[
        ("com/example/Foo.class", b"foo"),
        ("com/example/Foo$1.class", b"anon"),
        ("Example.class", b"example"),
        ("META-INF/services/javax.annotation.processing.Processor", b"svc"),
    ]);
    let set = CompiledArtifactSet::collect(dir.path()).unwrap();
    assert_eq!(
        set.names().collect::<Vec<_>>(),
        vec![
            "Example",
            "META-INF.services.javax.annotation.processing.Processor",
            "com.example.Foo",
            "com.example.Foo$1",
        ]
    );
    let foo = set.get("com.example.Foo").unwrap();
    assert_eq!(&*foo.bytes, b"foo");
    assert_eq!(foo.relative_path, Path::new("com").join("example").join("Foo.class"));
}

#[test]
fn test_classes_excludes_resources() {
    let dir = tree(&[("A.class", b"a"), ("a.txt", b"t")]);
    let set = CompiledArtifactSet::collect(dir.path()).unwrap();
    assert_eq!(set.len(), 2);
    let classes: Vec<_> = set.classes().map(|(n, _)| n).collect();
    assert_eq!(classes, vec!["A".to_string()]);
}

#[test]
fn test_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let set = CompiledArtifactSet::collect(dir.path()).unwrap();
    assert!(set.is_empty());
    assert!(!set.contains("Example"));
}

#[test]
fn test_clones_share_the_map() {
    let dir = tree(&[("A.class", b"a")]);
    let set = CompiledArtifactSet::collect(dir.path()).unwrap();
    let copy = set.clone();
    assert!(Arc::ptr_eq(&set.artifacts, &copy.artifacts));
}

#[test]
fn test_write_to_recreates_layout() {
    let dir = tree(&[("p/q/A.class", b"a"), ("B.class", b"b")]);
    let set = CompiledArtifactSet::collect(dir.path()).unwrap();
    let out = tempfile::tempdir().unwrap();
    set.write_to(out.path()).unwrap();
    assert_eq!(std::fs::read(out.path().join("p/q/A.class")).unwrap(), b"a");
    assert_eq!(CompiledArtifactSet::collect(out.path()).unwrap(), set);
}

#[test]
fn test_missing_root_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = CompiledArtifactSet::collect(&dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, CompileError::Io { action: "walk", .. }));
}
