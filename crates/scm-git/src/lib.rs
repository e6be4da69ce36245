//! Dual-backend git command layer
//!
//! [`GitApi`] performs repository operations for a build orchestrator against
//! a working tree it does not otherwise own. Each operation either shells out
//! to the `git` executable and parses its text output, or drives an opened
//! `git2` repository, as decided by the [`RoutingTable`].

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod identity;
pub mod listener;
pub mod parse;
pub mod runner;
pub mod state;
pub mod submodule;
pub mod types;

pub use api::GitApi;
pub use backend::{ListMode, Operation, RefBackend, Route, RoutingTable};
pub use config::GitSettings;
pub use error::{Error, Result};
pub use identity::{CommitIdentity, Identity};
pub use listener::{Listener, NullListener, TracingListener};
pub use runner::{CommandRunner, Invocation, Launcher, ProcessExit, SystemRunner};
pub use submodule::{OriginResolution, RemediationOutcome};
pub use types::{Branch, IndexEntry, LogEntry, MergeOptions, ObjectId, RemoteConfig, Revision, Tag};
