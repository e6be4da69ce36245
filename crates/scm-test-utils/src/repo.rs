//! [`TestRepo`]: a temporary directory holding an upstream and a workspace.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::git::{real_git_repo_with_commit, run_git};

/// A scratch area with an `upstream` repository and a `work` directory the
/// command layer operates on.
///
/// # Example
///
/// ```rust,no_run
/// use scm_test_utils::TestRepo;
///
/// let repo = TestRepo::new();
/// repo.init_upstream();
/// repo.clone_upstream();
/// repo.assert_file_exists("README.md");
/// ```
pub struct TestRepo {
    temp_dir: TempDir,
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepo {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the non-bare upstream repository.
    pub fn upstream(&self) -> PathBuf {
        self.root().join("upstream")
    }

    /// Path of the working tree under test. Not created until cloned into.
    pub fn work(&self) -> PathBuf {
        self.root().join("work")
    }

    /// Create the upstream with one commit on `main`.
    pub fn init_upstream(&self) -> PathBuf {
        let upstream = self.upstream();
        real_git_repo_with_commit(&upstream);
        upstream
    }

    /// Clone the upstream into the working tree with the `git` executable.
    pub fn clone_upstream(&self) -> PathBuf {
        let work = self.work();
        run_git(
            self.root(),
            &["clone", "-q", &self.upstream().to_string_lossy(), "work"],
        );
        run_git(&work, &["config", "user.email", "test@test.com"]);
        run_git(&work, &["config", "user.name", "Test User"]);
        run_git(&work, &["config", "commit.gpgsign", "false"]);
        work
    }

    pub fn write_file(&self, path: &str, contents: &str) {
        let file = self.work().join(path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(file, contents).unwrap();
    }

    pub fn read_file(&self, path: &str) -> String {
        fs::read_to_string(self.work().join(path))
            .unwrap_or_else(|e| panic!("Failed to read {path}: {e}"))
    }

    pub fn assert_file_exists(&self, path: &str) {
        let full = self.work().join(path);
        assert!(full.exists(), "Expected {} to exist", full.display());
    }

    pub fn assert_file_absent(&self, path: &str) {
        let full = self.work().join(path);
        assert!(!full.exists(), "Expected {} to be absent", full.display());
    }
}
