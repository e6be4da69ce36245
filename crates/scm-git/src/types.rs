//! Value types produced by parsers and library queries

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tree entry mode that marks a gitlink (submodule) rather than a blob or tree.
pub const GITLINK_MODE: &str = "160000";

/// A full-length object hash naming a commit, tree or blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(git2::Oid);

impl ObjectId {
    /// Hex length of a full object id.
    pub const HEX_LEN: usize = 40;

    pub fn as_oid(&self) -> git2::Oid {
        self.0
    }

    /// Abbreviate to the first `len` hex characters.
    pub fn short(&self, len: usize) -> String {
        let full = self.0.to_string();
        full[..len.min(full.len())].to_string()
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    /// Parse a full hex object id. Abbreviated ids are rejected; git2 would
    /// otherwise zero-pad them into a different object.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != Self::HEX_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidObjectId { value: s.to_string() });
        }
        git2::Oid::from_str(s)
            .map(Self)
            .map_err(|_| Error::InvalidObjectId { value: s.to_string() })
    }
}

impl From<git2::Oid> for ObjectId {
    fn from(oid: git2::Oid) -> Self {
        Self(oid)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A branch name and the commit it points to.
///
/// Remote-tracking branches are named `remote/branch`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Branch {
    pub name: String,
    pub sha1: ObjectId,
}

impl Branch {
    pub fn new(name: impl Into<String>, sha1: ObjectId) -> Self {
        Self {
            name: name.into(),
            sha1,
        }
    }

    /// The remote part of a `remote/branch` name.
    pub fn remote_name(&self) -> Result<&str> {
        self.name
            .split_once('/')
            .map(|(remote, _)| remote)
            .ok_or_else(|| Error::NoRemoteInBranch {
                branch: self.name.clone(),
            })
    }
}

/// A tag name and the commit it points to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub name: String,
    pub sha1: ObjectId,
}

/// One line of `git ls-tree` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub mode: String,
    pub kind: String,
    pub object: ObjectId,
    pub file: String,
}

impl IndexEntry {
    /// Gitlink entries are submodules; the mode is the only signal used.
    pub fn is_submodule(&self) -> bool {
        self.mode == GITLINK_MODE
    }
}

/// A commit selected for a build, with the branches that point at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub sha1: Option<ObjectId>,
    pub branches: Vec<Branch>,
}

impl Revision {
    pub fn new(sha1: ObjectId) -> Self {
        Self {
            sha1: Some(sha1),
            branches: Vec::new(),
        }
    }

    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branches.push(branch);
        self
    }
}

/// A named remote with its fetch URLs and ref-specs.
///
/// Only the first URL and the first ref-spec are ever used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub name: String,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub fetch_refspecs: Vec<String>,
}

impl RemoteConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            urls: vec![url.into()],
            fetch_refspecs: Vec::new(),
        }
    }

    pub fn with_refspec(mut self, refspec: impl Into<String>) -> Self {
        self.fetch_refspecs.push(refspec.into());
        self
    }

    pub fn first_url(&self) -> Result<&str> {
        self.urls
            .first()
            .map(String::as_str)
            .ok_or_else(|| Error::RemoteWithoutUrl {
                name: self.name.clone(),
            })
    }

    pub fn first_refspec(&self) -> Option<&str> {
        self.fetch_refspecs.first().map(String::as_str)
    }
}

/// Optional pre-build merge of another ref into the checked-out revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Remote holding the merge target
    pub merge_remote: Option<RemoteConfig>,
    /// Ref to merge
    pub merge_target: Option<String>,
}

impl MergeOptions {
    pub fn do_merge(&self) -> bool {
        self.merge_target.is_some()
    }

    /// `<remote>/<target>`, when both halves are configured.
    pub fn remote_branch_name(&self) -> Option<String> {
        let remote = self.merge_remote.as_ref()?;
        let target = self.merge_target.as_ref()?;
        Some(format!("{}/{}", remote.name, target))
    }
}

/// A commit id with its committer timestamp, from `log --pretty=format:%H#%ct`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: ObjectId,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: &str = "0123456789abcdef0123456789abcdef01234567";

    #[test]
    fn test_object_id_parse_trims() {
        let id: ObjectId = format!("  {SHA}\n").parse().unwrap();
        assert_eq!(id.to_string(), SHA);
        assert_eq!(id.short(7), "0123456");
    }

    #[test]
    fn test_object_id_rejects_abbreviated() {
        assert!("0123456".parse::<ObjectId>().is_err());
        assert!("zz23456789abcdef0123456789abcdef01234567".parse::<ObjectId>().is_err());
    }

    #[test]
    fn test_branch_remote_name() {
        let id: ObjectId = SHA.parse().unwrap();
        assert_eq!(Branch::new("origin/feature/x", id).remote_name().unwrap(), "origin");
        assert!(matches!(
            Branch::new("master", id).remote_name(),
            Err(Error::NoRemoteInBranch { .. })
        ));
    }

    #[test]
    fn test_merge_options() {
        let mut opts = MergeOptions::default();
        assert!(!opts.do_merge());
        assert_eq!(opts.remote_branch_name(), None);

        opts.merge_remote = Some(RemoteConfig::new("upstream", "/srv/repo"));
        opts.merge_target = Some("main".into());
        assert!(opts.do_merge());
        assert_eq!(opts.remote_branch_name().as_deref(), Some("upstream/main"));
        assert_eq!(opts.clone(), opts);
    }

    #[test]
    fn test_remote_without_url() {
        let remote = RemoteConfig {
            name: "origin".into(),
            urls: Vec::new(),
            fetch_refspecs: Vec::new(),
        };
        assert!(matches!(remote.first_url(), Err(Error::RemoteWithoutUrl { .. })));
    }
}
