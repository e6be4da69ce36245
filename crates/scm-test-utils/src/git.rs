//! Git repository fixtures.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Creates a `.git` directory without an object store.
///
/// Enough for existence checks; anything that opens the repository fails.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_dir(path: &Path) {
    fs::create_dir_all(path.join(".git/refs/heads"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create .git: {e}"));
    fs::write(path.join(".git/HEAD"), "ref: refs/heads/main\n")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write HEAD: {e}"));
}

/// Initialises an empty repository with `git2`.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> git2::Repository {
    git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Runs `git <args>` in `path` and returns trimmed stdout.
///
/// # Panics
/// Panics if git cannot be started or exits non-zero.
pub fn run_git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .unwrap_or_else(|e| panic!("run_git: failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "run_git: `git {args:?}` failed in {}:\n{}",
            path.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Initialises a repository on `main` with one commit of `README.md`.
///
/// User name, email and `commit.gpgsign = false` are set locally so commits
/// work on machines without a global git identity.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    fs::create_dir_all(path)
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to create dir: {e}"));
    run_git(path, &["init"]);
    run_git(path, &["config", "user.email", "test@test.com"]);
    run_git(path, &["config", "user.name", "Test User"]);
    run_git(path, &["config", "commit.gpgsign", "false"]);
    commit_file(path, "README.md", "# Test", "Initial commit");
    run_git(path, &["branch", "-M", "main"]);
}

/// Writes `name`, stages it and commits. Returns the new HEAD.
///
/// # Panics
/// Panics if writing or any git operation fails.
pub fn commit_file(path: &Path, name: &str, contents: &str, message: &str) -> String {
    let file = path.join(name);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("commit_file: failed to create {}: {e}", parent.display()));
    }
    fs::write(&file, contents)
        .unwrap_or_else(|e| panic!("commit_file: failed to write {name}: {e}"));
    run_git(path, &["add", name]);
    run_git(path, &["commit", "-m", message]);
    head_sha(path)
}

/// Full object id of HEAD.
pub fn head_sha(path: &Path) -> String {
    run_git(path, &["rev-parse", "HEAD"])
}

/// Records a submodule at `sub_path` pointing at `sha` and commits it along
/// with a matching `.gitmodules` entry.
///
/// The submodule is never cloned; only the gitlink exists in the tree.
///
/// # Panics
/// Panics if writing or any git operation fails.
pub fn add_gitlink(path: &Path, sub_path: &str, url: &str, sha: &str) {
    let gitmodules = format!("[submodule \"{sub_path}\"]\n\tpath = {sub_path}\n\turl = {url}\n");
    fs::write(path.join(".gitmodules"), gitmodules)
        .unwrap_or_else(|e| panic!("add_gitlink: failed to write .gitmodules: {e}"));
    let cacheinfo = format!("160000,{sha},{sub_path}");
    run_git(path, &["update-index", "--add", "--cacheinfo", &cacheinfo]);
    run_git(path, &["add", ".gitmodules"]);
    run_git(path, &["commit", "-m", &format!("Add submodule {sub_path}")]);
}
