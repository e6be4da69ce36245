//! Command-line implementation of [`RefBackend`]

use crate::backend::{ListMode, RefBackend};
use crate::identity::CommitIdentity;
use crate::runner::Launcher;
use crate::types::{Branch, ObjectId, Tag};
use crate::{Error, Result, parse};

/// Serves reference operations by running `git` and parsing its output.
#[derive(Debug, Clone, Copy)]
pub struct CliBackend<'a> {
    launcher: &'a Launcher,
}

impl<'a> CliBackend<'a> {
    pub fn new(launcher: &'a Launcher) -> Self {
        Self { launcher }
    }

    /// Resolve a revision expression to exactly one commit id.
    pub fn resolve(&self, rev: &str) -> Result<ObjectId> {
        let output = self.launcher.launch(&["rev-parse", rev])?;
        parse::parse_object_id_line(&output)?.ok_or_else(|| Error::EmptyResult {
            command: format!("git rev-parse {rev}"),
        })
    }
}

impl RefBackend for CliBackend<'_> {
    fn list_branches(&self, mode: ListMode) -> Result<Vec<Branch>> {
        let flag = match mode {
            ListMode::All => "-a",
            ListMode::Remote => "-r",
        };
        let output = self.launcher.launch(&["branch", flag])?;
        parse::parse_branches(&output, |name| self.resolve(name))
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        self.launcher
            .launch(&["branch", name])
            .map_err(|e| e.context(format!("Could not create branch {name}")))?;
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        self.launcher
            .launch(&["branch", "-D", name])
            .map_err(|e| e.context(format!("Could not delete branch {name}")))?;
        Ok(())
    }

    fn switch_to_new_branch(&self, name: &str, start_point: &str) -> Result<()> {
        self.launcher
            .launch(&["checkout", "-f", "-B", name, start_point])
            .map_err(|e| e.context(format!("Could not checkout {name} at {start_point}")))?;
        Ok(())
    }

    fn stage(&self, pattern: &str) -> Result<()> {
        self.launcher.launch(&["add", pattern])?;
        Ok(())
    }

    fn commit(&self, message: &str, identity: &CommitIdentity) -> Result<()> {
        self.launcher
            .launch_with_env(&["commit", "-m", message], &identity.to_env())
            .map_err(|e| e.context(format!("Could not commit: {message}")))?;
        Ok(())
    }

    fn has_commit(&self, sha1: &str) -> bool {
        let spec = format!("{sha1}^{{commit}}");
        self.launcher.launch(&["cat-file", "-e", spec.as_str()]).is_ok()
    }

    fn tags_on_commit(&self, rev: &str) -> Result<Vec<Tag>> {
        let Ok(target) = self.resolve(&format!("{rev}^{{commit}}")) else {
            tracing::debug!(rev = %rev, "Revision does not resolve; no tags");
            return Ok(Vec::new());
        };
        let output = self.launcher.launch(&[
            "for-each-ref",
            "--format=%(refname:short) %(objectname) %(*objectname)",
            "refs/tags",
        ])?;
        Ok(parse::parse_tag_refs(&output)?
            .into_iter()
            .filter(|tag| tag.sha1 == target)
            .collect())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let output = self.launcher.launch(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(parse::first_line(&output)?
            .filter(|name| *name != "HEAD")
            .map(str::to_string))
    }
}
