//! Filesystem helpers for the SCM command layer
//!
//! Path normalization, repository markers, workspace deletion and
//! format-agnostic settings loading.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::ScmPath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
