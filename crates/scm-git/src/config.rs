//! Settings for a [`GitApi`](crate::GitApi) instance

use std::path::PathBuf;

use scm_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::{Result, RoutingTable};

/// Settings loaded from a `.toml` or `.json` file.
///
/// ```toml
/// git_exe = "/usr/bin/git"
/// default_remote = "origin"
///
/// [routing]
/// stage = "cli"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSettings {
    /// Path to the `git` executable
    pub git_exe: PathBuf,

    /// Remote preferred by `get_default_remote` when none is given
    pub default_remote: String,

    /// Backend used for each dual-backend operation
    pub routing: RoutingTable,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            git_exe: PathBuf::from("git"),
            default_remote: "origin".to_string(),
            routing: RoutingTable::default(),
        }
    }
}

impl GitSettings {
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let settings = ConfigStore::new().load(path)?;
        tracing::debug!(path = %path, "Loaded git settings");
        Ok(settings)
    }
}
