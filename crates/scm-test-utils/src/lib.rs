//! Shared test utilities for the scm-bridge workspace.
//!
//! Fixtures drive the real `git` executable so the repositories they build
//! look exactly like the ones the command layer meets in a build.

pub mod git;
pub mod repo;

pub use git::{
    add_gitlink, commit_file, fake_git_dir, head_sha, real_git_repo, real_git_repo_with_commit,
    run_git,
};
pub use repo::TestRepo;
