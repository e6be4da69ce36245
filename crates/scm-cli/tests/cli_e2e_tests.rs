//! End-to-end tests that invoke the compiled `scm` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use scm_test_utils::{TestRepo, head_sha, run_git};
use tempfile::TempDir;

fn scm() -> Command {
    let mut cmd = Command::cargo_bin("scm").unwrap();
    cmd.env_remove("SCM_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn cloned() -> TestRepo {
    let repo = TestRepo::new();
    repo.init_upstream();
    repo.clone_upstream();
    repo
}

#[test]
fn test_no_command_prints_hint() {
    scm()
        .assert()
        .success()
        .stdout(predicate::str::contains("scm --help"));
}

#[test]
fn test_init_then_init_again_fails() {
    let temp = TempDir::new().unwrap();

    scm().arg("-C").arg(temp.path()).arg("init").assert().success();
    assert!(temp.path().join(".git").is_dir());

    scm()
        .arg("-C")
        .arg(temp.path())
        .arg("init")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("Cannot init a repository twice"));
}

#[test]
fn test_clone_and_list_branches() {
    let repo = TestRepo::new();
    let upstream = repo.init_upstream();
    let url = upstream.to_string_lossy().into_owned();

    scm()
        .arg("-C")
        .arg(repo.work())
        .args(["clone", url.as_str()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Cloning repository origin"));

    let sha = head_sha(&upstream);
    scm()
        .arg("-C")
        .arg(repo.work())
        .args(["branches", "--remote"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{sha} origin/main\n")));
}

#[test]
fn test_rev_parse_outside_repository_fails() {
    let temp = TempDir::new().unwrap();
    scm()
        .current_dir(temp.path())
        .args(["rev-parse", "HEAD"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_rev_parse_and_merge_base() {
    let repo = cloned();
    let sha = head_sha(&repo.work());

    scm()
        .current_dir(repo.work())
        .args(["rev-parse", "HEAD"])
        .assert()
        .success()
        .stdout(format!("{sha}\n"));

    scm()
        .current_dir(repo.work())
        .args(["merge-base", "HEAD", "origin/main"])
        .assert()
        .success()
        .stdout(format!("{sha}\n"));
}

#[test]
fn test_tag_and_tag_exists() {
    let repo = cloned();
    let work = repo.work();

    scm()
        .current_dir(&work)
        .args(["tag", "nightly build", "-m", "CI"])
        .assert()
        .success();
    assert_eq!(run_git(&work, &["tag", "-l"]), "nightly_build");

    scm()
        .current_dir(&work)
        .args(["tag-exists", "nightly build"])
        .assert()
        .success()
        .stdout("true\n");

    scm()
        .current_dir(&work)
        .args(["describe", "HEAD"])
        .assert()
        .success()
        .stdout("nightly_build\n");
}

#[test]
fn test_checkout_creates_branch() {
    let repo = cloned();
    let work = repo.work();
    let sha = head_sha(&work);

    scm()
        .current_dir(&work)
        .args(["checkout", sha.as_str(), "-b", "feature"])
        .assert()
        .success();
    assert_eq!(run_git(&work, &["rev-parse", "--abbrev-ref", "HEAD"]), "feature");
}

#[test]
fn test_default_remote() {
    let repo = cloned();
    scm()
        .current_dir(repo.work())
        .arg("default-remote")
        .assert()
        .success()
        .stdout("origin\n");
}

#[test]
fn test_config_file_routes_to_cli() {
    let repo = cloned();
    let config = repo.root().join("scm.toml");
    std::fs::write(&config, "default_remote = \"origin\"\n\n[routing]\nlist_branches = \"cli\"\n").unwrap();

    scm()
        .current_dir(repo.work())
        .arg("--config")
        .arg(&config)
        .arg("branches")
        .assert()
        .success()
        .stdout(predicate::str::contains("origin/main"))
        .stdout(predicate::str::contains(" main\n"));
}

#[test]
fn test_bad_config_is_reported() {
    let repo = cloned();
    let config = repo.root().join("scm.toml");
    std::fs::write(&config, "[routing]\nstage = \"sideways\"\n").unwrap();

    scm()
        .current_dir(repo.work())
        .arg("--config")
        .arg(&config)
        .arg("clean")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_clean_removes_untracked() {
    let repo = cloned();
    repo.write_file("junk.txt", "junk");

    scm().current_dir(repo.work()).arg("clean").assert().success();
    repo.assert_file_absent("junk.txt");
}
