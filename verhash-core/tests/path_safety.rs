use std::fs;
use verhash_core::path_safety::validate_rel_path;

#[test]
fn plain_relative_paths_resolve_under_root() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("a/b")).unwrap();
    let p = validate_rel_path(root, "a/b/c.txt").unwrap();
    assert_eq!(p, root.join("a").join("b").join("c.txt"));
    let p = validate_rel_path(root, "./a/file with  spaces").unwrap();
    assert_eq!(p, root.join("a").join("file with  spaces"));
}

#[test]
fn traversal_and_absolute_paths_are_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    for bad in ["", "../x", "a/../../x", "/etc/passwd", "a/.."] {
        let err = validate_rel_path(tmp.path(), bad).expect_err(bad);
        let msg = format!("{:#}", err);
        assert!(
            msg.contains("parent traversal") || msg.contains("absolute") || msg.contains("empty"),
            "unexpected error for {bad:?}: {msg}"
        );
    }
}
