//! Submodule URL remediation against real repositories.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use scm_git::{Branch, GitApi, NullListener, RemediationOutcome, Revision};
use scm_test_utils::{TestRepo, add_gitlink, head_sha, run_git};

/// A non-bare upstream whose HEAD records a gitlink at `libs/foo`, cloned
/// into the working tree.
fn superproject(repo: &TestRepo) -> GitApi {
    let upstream = repo.init_upstream();
    let sha = head_sha(&upstream);
    add_gitlink(&upstream, "libs/foo", "../foo.git", &sha);
    repo.clone_upstream();
    GitApi::new("git", repo.work(), Arc::new(NullListener), BTreeMap::new()).unwrap()
}

fn submodule_url(work: &Path) -> String {
    run_git(work, &["config", "--get", "submodule.libs/foo.url"])
}

#[test]
fn test_non_bare_origin_rewrites_submodule_url() {
    let repo = TestRepo::new();
    let api = superproject(&repo);
    let upstream = repo.upstream().to_string_lossy().into_owned();
    api.set_remote_url("origin", &format!("{upstream}/.git")).unwrap();

    let outcome = api.setup_submodule_urls_for_remote("origin").unwrap();

    assert_eq!(outcome, RemediationOutcome::Rewritten(vec!["libs/foo".to_string()]));
    assert_eq!(submodule_url(&repo.work()), format!("{upstream}/libs/foo"));
}

#[test]
fn test_bareness_check_detects_non_bare_without_suffix() {
    let repo = TestRepo::new();
    let api = superproject(&repo);
    let upstream = repo.upstream().to_string_lossy().into_owned();

    let outcome = api.setup_submodule_urls_for_remote("origin").unwrap();

    assert_eq!(outcome, RemediationOutcome::Rewritten(vec!["libs/foo".to_string()]));
    assert_eq!(submodule_url(&repo.work()), format!("{upstream}/libs/foo"));
}

#[test]
fn test_bare_origin_keeps_configured_urls() {
    let repo = TestRepo::new();
    let api = superproject(&repo);
    run_git(repo.root(), &["clone", "-q", "--bare", "upstream", "upstream.git"]);
    let bare = repo.root().join("upstream.git");
    api.set_remote_url("origin", &bare.to_string_lossy()).unwrap();

    let outcome = api.setup_submodule_urls_for_remote("origin").unwrap();

    assert_eq!(outcome, RemediationOutcome::Bare);
    assert!(!submodule_url(&repo.work()).ends_with("/libs/foo"));
}

#[test]
fn test_materialized_submodule_origin_is_rewritten() {
    let repo = TestRepo::new();
    let api = superproject(&repo);
    let upstream = repo.upstream().to_string_lossy().into_owned();
    let sub = repo.work().join("libs/foo");
    std::fs::create_dir_all(&sub).unwrap();
    run_git(&sub, &["init", "-q"]);
    run_git(&sub, &["remote", "add", "origin", "/old/location"]);

    let revision = Revision::new(head_sha(&repo.work()).parse().unwrap()).with_branch(Branch::new(
        "origin/main",
        head_sha(&repo.work()).parse().unwrap(),
    ));
    let outcome = api.setup_submodule_urls(&revision).unwrap();

    assert_eq!(outcome, RemediationOutcome::Rewritten(vec!["libs/foo".to_string()]));
    assert_eq!(
        run_git(&sub, &["config", "--get", "remote.origin.url"]),
        format!("{upstream}/libs/foo")
    );
}

#[test]
fn test_scp_style_remote_is_left_alone() {
    let repo = TestRepo::new();
    let api = superproject(&repo);
    api.set_remote_url("origin", "git@example.com:team/repo.git").unwrap();

    assert_eq!(api.fix_submodule_urls("origin"), RemediationOutcome::Unresolvable);
}

#[test]
fn test_unknown_remote_is_noop() {
    let repo = TestRepo::new();
    let api = superproject(&repo);
    assert_eq!(
        api.fix_submodule_urls("nowhere"),
        RemediationOutcome::RemoteUrlUnavailable
    );
}

#[test]
fn test_gitmodules_detection() {
    let repo = TestRepo::new();
    let api = superproject(&repo);

    assert!(api.has_git_modules().unwrap());
    assert!(api.has_git_modules_at("HEAD").unwrap());
    assert!(!api.has_git_modules_at("HEAD~1").unwrap());

    let submodules = api.get_submodules("HEAD").unwrap();
    assert_eq!(submodules.len(), 1);
    assert_eq!(submodules[0].file, "libs/foo");
}

#[test]
fn test_nested_gitlink_found_only_recursively() {
    let repo = TestRepo::new();
    let api = superproject(&repo);

    let top_level: Vec<String> = api.ls_tree("HEAD").unwrap().into_iter().map(|e| e.file).collect();
    assert!(top_level.contains(&"libs".to_string()));
    assert!(!top_level.contains(&"libs/foo".to_string()));

    let submodules = api.get_submodules("HEAD").unwrap();
    assert_eq!(submodules.len(), 1);
    assert!(submodules[0].is_submodule());
    assert_eq!(submodules[0].file, "libs/foo");
}

#[test]
fn test_gitmodules_file_missing() {
    let repo = TestRepo::new();
    repo.init_upstream();
    repo.clone_upstream();
    let api = GitApi::new("git", repo.work(), Arc::new(NullListener), BTreeMap::new()).unwrap();

    assert!(!api.has_git_modules().unwrap());
    assert!(!api.has_git_modules_at("HEAD").unwrap());
}
