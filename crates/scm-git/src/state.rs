//! Repository State Guard: existence, bareness and open-handle preconditions

use std::path::Path;

use scm_fs::ScmPath;

use crate::runner::Launcher;
use crate::{Error, Result, parse};

/// Whether `<workspace>/.git` exists.
pub fn has_repository(workspace: &Path) -> Result<bool> {
    has_repository_at(workspace, ScmPath::GitDir.as_str())
}

/// Whether `<workspace>/<git_dir>` exists.
///
/// A missing repository is `Ok(false)`; denied access is
/// [`Error::PermissionDenied`].
pub fn has_repository_at(workspace: &Path, git_dir: &str) -> Result<bool> {
    scm_fs::io::probe_exists(&workspace.join(git_dir)).map_err(|e| match e {
        scm_fs::Error::PermissionDenied { path, source } => Error::PermissionDenied { path, source },
        other => Error::Fs(other),
    })
}

/// Fail unless a repository exists at `workspace` and `handle` is bound.
pub fn verify_repository<'h, T>(workspace: &Path, handle: Option<&'h T>) -> Result<&'h T> {
    match handle {
        Some(handle) if has_repository(workspace)? => Ok(handle),
        _ => Err(Error::InvalidState {
            path: workspace.to_path_buf(),
        }),
    }
}

/// Ask git whether the repository at `git_dir` (or the working tree's own,
/// when `None`) is bare.
pub fn is_bare(launcher: &Launcher, git_dir: Option<&str>) -> Result<bool> {
    let output = match git_dir {
        Some(dir) => launcher.launch(&[
            format!("--git-dir={dir}"),
            "rev-parse".into(),
            "--is-bare-repository".into(),
        ])?,
        None => launcher.launch(&["rev-parse", "--is-bare-repository"])?,
    };
    parse::parse_is_bare(&output)
}
