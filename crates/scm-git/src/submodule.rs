//! Submodule URL Remediator
//!
//! Submodule URLs in `.gitmodules` are usually written relative to a bare
//! upstream. When the superproject was cloned from a non-bare repository
//! those URLs miss the working tree by one level. The remediator works out
//! whether the superproject's origin is bare and, if it is not, points every
//! submodule at `<origin>/<submodule path>`.
//!
//! Deciding what to do ([`resolve_origin`]) is kept apart from doing it
//! ([`GitApi::fix_submodule_urls`]) so each no-op path is a value a test can
//! match on.

use scm_fs::{NormalizedPath, ScmPath};
use url::Url;

use crate::api::GitApi;
use crate::types::Revision;
use crate::{Error, Result};

/// Where a superproject's origin lives once the `/.git` suffix is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginLocation {
    /// A filesystem path, from a schemeless URL or a host-less `file:` URL
    Local(NormalizedPath),
    /// Anything reached over the network
    Remote(Url),
}

impl OriginLocation {
    /// The URL of the submodule checked out at `file` under this origin.
    pub fn submodule_url(&self, file: &str) -> String {
        match self {
            Self::Local(path) => path.join(file).as_str().to_string(),
            // Scheme and host are kept; a bare path would point the
            // submodule at the local filesystem instead of the server.
            Self::Remote(url) => {
                let mut joined = url.clone();
                let path = NormalizedPath::new(url.path()).join(file);
                joined.set_path(path.as_str());
                joined.to_string()
            }
        }
    }

    fn probe_candidates(&self) -> Option<[NormalizedPath; 2]> {
        match self {
            Self::Local(path) => Some([path.clone(), path.join(ScmPath::GitDir.as_str())]),
            Self::Remote(_) => None,
        }
    }
}

/// Outcome of inspecting the superproject's remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginResolution {
    /// The URL is not a standard URI (e.g. `user@host:repo.git`); nothing
    /// can be inferred from it.
    Unresolvable { url: String },
    Resolved { origin: OriginLocation, bare: bool },
}

/// What [`GitApi::fix_submodule_urls`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemediationOutcome {
    /// The remote's URL could not be read
    RemoteUrlUnavailable,
    /// The remote's URL could not be interpreted
    Unresolvable,
    /// The origin is bare; configured URLs are left as they are
    Bare,
    /// Listing or rewriting submodules failed part way
    Failed { rewritten: Vec<String>, reason: String },
    /// Paths of the submodules whose URLs were rewritten
    Rewritten(Vec<String>),
}

/// Strip a trailing `/.git`, reporting whether it was there.
pub fn strip_git_suffix(url: &str) -> (&str, bool) {
    match url.strip_suffix(ScmPath::GitDir.as_suffix().as_str()) {
        Some(stripped) => (stripped, true),
        None => (url, false),
    }
}

/// Classify an already suffix-stripped URL.
pub fn classify(url: &str) -> Option<OriginLocation> {
    match Url::parse(url) {
        // `C:/work/repo` parses with a one-letter scheme.
        Ok(parsed) if parsed.scheme().len() == 1 => {
            Some(OriginLocation::Local(NormalizedPath::new(url)))
        }
        Ok(parsed) if parsed.scheme() == "file" && parsed.host_str().is_none_or(str::is_empty) => {
            let path = parsed
                .to_file_path()
                .map(NormalizedPath::new)
                .unwrap_or_else(|()| NormalizedPath::new(parsed.path()));
            Some(OriginLocation::Local(path))
        }
        Ok(parsed) if parsed.cannot_be_a_base() => None,
        Ok(parsed) => Some(OriginLocation::Remote(parsed)),
        Err(url::ParseError::RelativeUrlWithoutBase) if is_scp_like(url) => None,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Some(OriginLocation::Local(NormalizedPath::new(url)))
        }
        Err(_) => None,
    }
}

/// `host:path` shorthand: a colon before any slash.
fn is_scp_like(url: &str) -> bool {
    match (url.find(':'), url.find('/')) {
        (Some(colon), Some(slash)) => colon < slash,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Decide whether the origin at `url` is bare.
///
/// A `/.git` suffix makes non-bare the assumption, anything else bare. For
/// local origins `probe` is asked about the path and then `<path>/.git`; the
/// first answer that is not an error replaces the assumption.
pub fn resolve_origin(url: &str, mut probe: impl FnMut(&str) -> Result<bool>) -> OriginResolution {
    let (stripped, had_suffix) = strip_git_suffix(url);
    let Some(origin) = classify(stripped) else {
        tracing::debug!(url = %url, "Remote URL is not a URI, leaving submodule URLs alone");
        return OriginResolution::Unresolvable {
            url: url.to_string(),
        };
    };

    let mut bare = !had_suffix;
    for candidate in origin.probe_candidates().into_iter().flatten() {
        match probe(candidate.as_str()) {
            Ok(answer) => {
                bare = answer;
                break;
            }
            Err(e) => tracing::debug!(path = %candidate, error = %e, "Bareness probe failed"),
        }
    }
    OriginResolution::Resolved { origin, bare }
}

impl GitApi {
    /// Initialise and sync submodules, then remediate their URLs against the
    /// remote tracked by the revision's first branch.
    ///
    /// A branch name without a `remote/` prefix falls back to the default
    /// remote.
    pub fn setup_submodule_urls(&self, revision: &Revision) -> Result<RemediationOutcome> {
        let remote = match revision.branches.first().map(|b| b.remote_name()) {
            Some(Ok(remote)) => self.get_default_remote(Some(remote))?,
            Some(Err(e)) => {
                tracing::debug!(error = %e, "Falling back to the default remote");
                self.get_default_remote(None)?
            }
            None => self.get_default_remote(None)?,
        };
        self.setup_submodule_urls_for_remote(&remote)
    }

    pub fn setup_submodule_urls_for_remote(&self, remote: &str) -> Result<RemediationOutcome> {
        self.submodule_init()?;
        self.submodule_sync()?;
        Ok(self.fix_submodule_urls(remote))
    }

    /// Rewrite submodule URLs when `remote` points at a non-bare repository.
    ///
    /// Never fails: each no-op path is reported as a [`RemediationOutcome`]
    /// and logged.
    pub fn fix_submodule_urls(&self, remote: &str) -> RemediationOutcome {
        let url = match self.get_remote_url(remote) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(remote = %remote, error = %e, "Could not read remote URL");
                return RemediationOutcome::RemoteUrlUnavailable;
            }
        };

        let origin = match resolve_origin(&url, |path| self.is_bare_repository(Some(path))) {
            OriginResolution::Unresolvable { .. } => return RemediationOutcome::Unresolvable,
            OriginResolution::Resolved { bare: true, .. } => return RemediationOutcome::Bare,
            OriginResolution::Resolved { origin, bare: false } => origin,
        };

        let mut rewritten = Vec::new();
        match self.rewrite_submodule_urls(&origin, &mut rewritten) {
            Ok(()) => RemediationOutcome::Rewritten(rewritten),
            Err(e) => {
                self.console(format!("Could not fix submodule URLs: {e}"));
                tracing::warn!(error = %e, "Submodule URL remediation stopped");
                RemediationOutcome::Failed {
                    rewritten,
                    reason: e.to_string(),
                }
            }
        }
    }

    fn rewrite_submodule_urls(&self, origin: &OriginLocation, rewritten: &mut Vec<String>) -> Result<()> {
        for entry in self.get_submodules("HEAD")? {
            let url = origin.submodule_url(&entry.file);
            self.set_submodule_url(&entry.file, &url)?;

            let git_dir = NormalizedPath::new(&entry.file).join(ScmPath::GitDir.as_str());
            if self.has_git_repo_at(git_dir.as_str())? {
                let current = self
                    .get_remote_url_in("origin", git_dir.as_str())
                    .unwrap_or_else(|e: Error| {
                        tracing::debug!(submodule = %entry.file, error = %e, "No origin in submodule");
                        String::new()
                    });
                if !current.is_empty() {
                    self.set_remote_url_in("origin", &url, git_dir.as_str())?;
                }
            }

            tracing::debug!(submodule = %entry.file, url = %url, "Rewrote submodule URL");
            rewritten.push(entry.file);
        }
        Ok(())
    }
}
