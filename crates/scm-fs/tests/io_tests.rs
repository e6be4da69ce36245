use scm_fs::io::{probe_exists, remove_tree};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_probe_missing_path_is_false() {
    let temp = TempDir::new().unwrap();
    assert!(!probe_exists(&temp.path().join("missing")).unwrap());
}

#[test]
fn test_probe_existing_path_is_true() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join(".git")).unwrap();
    assert!(probe_exists(&temp.path().join(".git")).unwrap());
}

#[test]
fn test_remove_tree_deletes_nested_content() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("ws");
    fs::create_dir_all(workspace.join("a/b")).unwrap();
    fs::write(workspace.join("a/b/file.txt"), "x").unwrap();

    remove_tree(&workspace).unwrap();
    assert!(!workspace.exists());
}

#[test]
fn test_remove_tree_missing_is_ok() {
    let temp = TempDir::new().unwrap();
    remove_tree(&temp.path().join("never-created")).unwrap();
}

#[cfg(unix)]
#[test]
fn test_remove_tree_does_not_follow_symlinks() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("keep.txt"), "keep").unwrap();
    let link = temp.path().join("link");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    remove_tree(&link).unwrap();
    assert!(!link.exists());
    assert!(target.join("keep.txt").exists());
}
