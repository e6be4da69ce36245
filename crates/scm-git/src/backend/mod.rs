//! Dual-backend strategy for reference and index operations
//!
//! Operations with both a command-line and an embedded-library
//! implementation go through [`RefBackend`]. [`RoutingTable`] decides, per
//! [`Operation`], which implementation a [`GitApi`](crate::GitApi) uses.
//! The defaults send everything to the library: listings keep full ref
//! fidelity and identities are passed as objects rather than environment
//! strings.

mod cli;
mod library;

pub use cli::CliBackend;
pub use library::LibraryBackend;

use serde::{Deserialize, Serialize};

use crate::identity::CommitIdentity;
use crate::types::{Branch, Tag};
use crate::Result;

/// Which branches a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Local and remote-tracking branches
    All,
    /// Remote-tracking branches only
    Remote,
}

impl ListMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Remote => "remote",
        }
    }
}

/// Reference and index operations available from both backends.
pub trait RefBackend {
    /// List branches, skipping symbolic aliases such as `origin/HEAD`.
    fn list_branches(&self, mode: ListMode) -> Result<Vec<Branch>>;

    /// Create a branch at the current HEAD.
    fn create_branch(&self, name: &str) -> Result<()>;

    /// Delete a local branch.
    fn delete_branch(&self, name: &str) -> Result<()>;

    /// Create (or replace) `name` at `start_point` and check it out.
    fn switch_to_new_branch(&self, name: &str, start_point: &str) -> Result<()>;

    /// Stage files matching `pattern`.
    fn stage(&self, pattern: &str) -> Result<()>;

    /// Commit the index with an explicit identity.
    fn commit(&self, message: &str, identity: &CommitIdentity) -> Result<()>;

    /// Whether `sha1` names a commit present in the object store.
    fn has_commit(&self, sha1: &str) -> bool;

    /// Tags whose target commit is the one `rev` resolves to.
    fn tags_on_commit(&self, rev: &str) -> Result<Vec<Tag>>;

    /// The checked-out branch, or `None` when HEAD is detached or unborn.
    fn current_branch(&self) -> Result<Option<String>>;
}

/// Operations that can be served by either backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListBranches,
    CreateBranch,
    DeleteBranch,
    SwitchBranch,
    Stage,
    Commit,
    CommitLookup,
    TagsOnCommit,
    CurrentBranch,
}

/// Backend that serves an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// The external `git` executable
    Cli,
    /// The in-process `git2` repository
    #[default]
    Library,
}

/// Per-operation backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingTable {
    pub list_branches: Route,
    pub create_branch: Route,
    pub delete_branch: Route,
    pub switch_branch: Route,
    pub stage: Route,
    pub commit: Route,
    pub commit_lookup: Route,
    pub tags_on_commit: Route,
    pub current_branch: Route,
}

impl RoutingTable {
    /// Send every operation through one backend.
    pub fn uniform(route: Route) -> Self {
        Self {
            list_branches: route,
            create_branch: route,
            delete_branch: route,
            switch_branch: route,
            stage: route,
            commit: route,
            commit_lookup: route,
            tags_on_commit: route,
            current_branch: route,
        }
    }

    pub fn route(&self, operation: Operation) -> Route {
        match operation {
            Operation::ListBranches => self.list_branches,
            Operation::CreateBranch => self.create_branch,
            Operation::DeleteBranch => self.delete_branch,
            Operation::SwitchBranch => self.switch_branch,
            Operation::Stage => self.stage,
            Operation::Commit => self.commit,
            Operation::CommitLookup => self.commit_lookup,
            Operation::TagsOnCommit => self.tags_on_commit,
            Operation::CurrentBranch => self.current_branch,
        }
    }
}
