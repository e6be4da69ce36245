//! Error types for scm-git
//!
//! Every failure leaves the crate as an [`Error`]. The message is meant for a
//! build log; the underlying cause, when there is one, is reachable through
//! [`std::error::Error::source`].

use std::path::PathBuf;

/// Result type for scm-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in scm-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid repository state: no repository is open at {path}")]
    InvalidState { path: PathBuf },

    #[error("Cannot init a repository twice at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Permission denied while checking for a repository at {path}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error performing command: {command}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command \"{command}\" returned status code {status}: {output}")]
    CommandFailed {
        command: String,
        status: i32,
        output: String,
    },

    #[error("Result has multiple lines: {output}")]
    AmbiguousResult { output: String },

    #[error("Command \"{command}\" produced no output")]
    EmptyResult { command: String },

    #[error("Unexpected {what} output: {line}")]
    UnexpectedOutput { what: &'static str, line: String },

    #[error("Invalid object id: {value}")]
    InvalidObjectId { value: String },

    #[error("Could not {operation} '{argument}': {source}")]
    Library {
        operation: &'static str,
        argument: String,
        #[source]
        source: git2::Error,
    },

    #[error("No remotes found!")]
    NoRemotes,

    #[error("No remote from branch name ({branch})")]
    NoRemoteInBranch { branch: String },

    #[error("Remote '{name}' has no URL configured")]
    RemoteWithoutUrl { name: String },

    #[error("Failed to delete workspace {path}")]
    WorkspaceCleanup {
        path: PathBuf,
        #[source]
        source: scm_fs::Error,
    },

    #[error("Filesystem error: {0}")]
    Fs(#[from] scm_fs::Error),

    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap a git2 failure with the operation and its key argument.
    pub fn library(operation: &'static str, argument: impl Into<String>, source: git2::Error) -> Self {
        Self::Library {
            operation,
            argument: argument.into(),
            source,
        }
    }

    /// Rewrap this error under a higher-level message.
    pub fn context(self, message: impl Into<String>) -> Self {
        Self::Context {
            message: message.into(),
            source: Box::new(self),
        }
    }
}
