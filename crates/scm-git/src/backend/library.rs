//! Embedded-library implementation of [`RefBackend`] on top of `git2`

use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{BranchType, ErrorCode, IndexAddOption, Oid, ReferenceType, Repository};

use crate::backend::{ListMode, RefBackend};
use crate::identity::CommitIdentity;
use crate::types::{Branch, Tag};
use crate::{Error, Result};

/// Owns the opened repository handle of one [`GitApi`](crate::GitApi).
pub struct LibraryBackend {
    repo: Repository,
}

impl std::fmt::Debug for LibraryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryBackend")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl LibraryBackend {
    pub fn open(workspace: &Path) -> Result<Self> {
        let repo = Repository::open(workspace)
            .map_err(|e| Error::library("open repository", workspace.display().to_string(), e))?;
        Ok(Self { repo })
    }

    pub fn init(workspace: &Path) -> Result<Self> {
        let repo = Repository::init(workspace)
            .map_err(|e| Error::library("init repository", workspace.display().to_string(), e))?;
        Ok(Self { repo })
    }

    /// Clone `url` into `workspace`, naming the remote `remote_name`.
    pub fn clone_from(url: &str, remote_name: &str, workspace: &Path) -> Result<Self> {
        let mut builder = RepoBuilder::new();
        builder.remote_create(|repo, _default_name, url| repo.remote(remote_name, url));
        let repo = builder
            .clone(url, workspace)
            .map_err(|e| Error::library("clone", url, e))?;
        Ok(Self { repo })
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    fn head_commit(&self) -> std::result::Result<Option<git2::Commit<'_>>, git2::Error> {
        match self.repo.head() {
            Ok(head) => head.peel_to_commit().map(Some),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl RefBackend for LibraryBackend {
    fn list_branches(&self, mode: ListMode) -> Result<Vec<Branch>> {
        let filter = match mode {
            ListMode::All => None,
            ListMode::Remote => Some(BranchType::Remote),
        };
        let lib_err = |e| Error::library("list branches", mode.as_str(), e);

        let mut result = Vec::new();
        for item in self.repo.branches(filter).map_err(lib_err)? {
            let (branch, _) = item.map_err(lib_err)?;
            let reference = branch.get();
            if reference.kind() == Some(ReferenceType::Symbolic) {
                continue;
            }
            let (Some(name), Some(target)) = (branch.name().map_err(lib_err)?, reference.target())
            else {
                continue;
            };
            result.push(Branch::new(name, target.into()));
        }
        Ok(result)
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        let lib_err = |e| Error::library("create branch", name, e);
        let head = self
            .head_commit()
            .map_err(lib_err)?
            .ok_or_else(|| lib_err(git2::Error::from_str("HEAD does not point at a commit")))?;
        self.repo.branch(name, &head, false).map_err(lib_err)?;
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let lib_err = |e| Error::library("delete branch", name, e);
        let mut branch = self.repo.find_branch(name, BranchType::Local).map_err(lib_err)?;
        branch.delete().map_err(lib_err)?;
        Ok(())
    }

    fn switch_to_new_branch(&self, name: &str, start_point: &str) -> Result<()> {
        let lib_err = |e| Error::library("checkout", format!("{name} at {start_point}"), e);
        let commit = self
            .repo
            .revparse_single(start_point)
            .and_then(|object| object.peel_to_commit())
            .map_err(lib_err)?;

        self.repo.branch(name, &commit, true).map_err(lib_err)?;
        self.repo
            .set_head(&format!("refs/heads/{name}"))
            .map_err(lib_err)?;
        self.repo
            .checkout_head(Some(CheckoutBuilder::new().force()))
            .map_err(lib_err)?;
        Ok(())
    }

    fn stage(&self, pattern: &str) -> Result<()> {
        let lib_err = |e| Error::library("add", pattern, e);
        let mut index = self.repo.index().map_err(lib_err)?;
        index
            .add_all([pattern], IndexAddOption::DEFAULT, None)
            .map_err(lib_err)?;
        index.write().map_err(lib_err)?;
        Ok(())
    }

    fn commit(&self, message: &str, identity: &CommitIdentity) -> Result<()> {
        let lib_err = |e| Error::library("commit", message, e);

        let author = match &identity.author {
            Some(id) => id.to_signature(),
            None => self.repo.signature(),
        }
        .map_err(lib_err)?;
        let committer = match &identity.committer {
            Some(id) => id.to_signature(),
            None => self.repo.signature(),
        }
        .map_err(lib_err)?;

        let mut index = self.repo.index().map_err(lib_err)?;
        let tree_id = index.write_tree().map_err(lib_err)?;
        let tree = self.repo.find_tree(tree_id).map_err(lib_err)?;
        let parent = self.head_commit().map_err(lib_err)?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &author, &committer, message, &tree, &parents)
            .map_err(lib_err)?;
        Ok(())
    }

    fn has_commit(&self, sha1: &str) -> bool {
        Oid::from_str(sha1)
            .and_then(|oid| self.repo.find_commit(oid))
            .is_ok()
    }

    fn tags_on_commit(&self, rev: &str) -> Result<Vec<Tag>> {
        let lib_err = |e| Error::library("list tags on", rev, e);
        let target = match self.repo.revparse_single(rev).and_then(|o| o.peel_to_commit()) {
            Ok(commit) => commit.id(),
            Err(e) if e.code() == ErrorCode::NotFound => {
                tracing::debug!(rev = %rev, "Revision does not resolve; no tags");
                return Ok(Vec::new());
            }
            Err(e) => return Err(lib_err(e)),
        };

        let names = self.repo.tag_names(None).map_err(lib_err)?;
        let mut tags = Vec::new();
        for name in names.iter().flatten() {
            let reference = self
                .repo
                .find_reference(&format!("refs/tags/{name}"))
                .map_err(lib_err)?;
            // Tags on trees or blobs do not peel to a commit and never match.
            if let Ok(commit) = reference.peel_to_commit()
                && commit.id() == target
            {
                tags.push(Tag {
                    name: name.to_string(),
                    sha1: commit.id().into(),
                });
            }
        }
        Ok(tags)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().map(str::to_string)),
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::UnbornBranch => Ok(None),
            Err(e) => Err(Error::library("read", "HEAD", e)),
        }
    }
}
