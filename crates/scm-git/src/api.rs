//! Repository Operation Facade
//!
//! [`GitApi`] is the single entry point used by the build orchestrator. It
//! owns the working tree, the environment handed to `git`, the console
//! listener and, once a repository exists, the opened `git2` handle.
//! Operations that only have a reliable command-line form run through the
//! [`Launcher`]; the rest go through a [`RefBackend`] picked from the
//! [`RoutingTable`].

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use scm_fs::ScmPath;

use crate::backend::{CliBackend, LibraryBackend, ListMode, Operation, RefBackend, Route, RoutingTable};
use crate::config::GitSettings;
use crate::identity::CommitIdentity;
use crate::listener::Listener;
use crate::runner::{CommandRunner, Launcher};
use crate::types::{Branch, IndexEntry, LogEntry, ObjectId, RemoteConfig, Revision, Tag};
use crate::{Error, Result, parse, state};

/// Unified command layer over one working tree.
pub struct GitApi {
    launcher: Launcher,
    listener: Arc<dyn Listener>,
    routing: RoutingTable,
    default_remote: String,
    handle: Option<LibraryBackend>,
}

impl std::fmt::Debug for GitApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitApi")
            .field("launcher", &self.launcher)
            .field("routing", &self.routing)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl GitApi {
    /// Bind to `workspace`, opening the repository there if one exists.
    ///
    /// A repository that exists but cannot be opened leaves the handle
    /// unbound; operations needing it then fail with
    /// [`Error::InvalidState`].
    pub fn new(
        git_exe: impl Into<PathBuf>,
        workspace: impl Into<PathBuf>,
        listener: Arc<dyn Listener>,
        env: BTreeMap<String, String>,
    ) -> Result<Self> {
        let launcher = Launcher::new(git_exe, workspace, env);
        let handle = if state::has_repository(launcher.workspace())? {
            match LibraryBackend::open(launcher.workspace()) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::warn!(error = %e, "Repository detected but could not be opened");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            launcher,
            listener,
            routing: RoutingTable::default(),
            default_remote: "origin".to_string(),
            handle,
        })
    }

    /// Bind using loaded [`GitSettings`].
    pub fn with_settings(
        settings: &GitSettings,
        workspace: impl Into<PathBuf>,
        listener: Arc<dyn Listener>,
        env: BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut api = Self::new(&settings.git_exe, workspace, listener, env)?;
        api.routing = settings.routing.clone();
        api.default_remote = settings.default_remote.clone();
        Ok(api)
    }

    pub fn with_routing(mut self, routing: RoutingTable) -> Self {
        self.routing = routing;
        self
    }

    /// Replace the process runner used for every `git` invocation.
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.launcher = self.launcher.with_runner(runner);
        self
    }

    pub fn workspace(&self) -> &Path {
        self.launcher.workspace()
    }

    pub fn git_exe(&self) -> &Path {
        self.launcher.git_exe()
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        self.launcher.env()
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    /// Run an arbitrary `git` command in the working tree.
    pub fn launch_command<S: AsRef<str>>(&self, args: &[S]) -> Result<String> {
        self.launcher.launch(args)
    }

    pub(crate) fn console(&self, message: impl AsRef<str>) {
        self.listener.line(message.as_ref());
    }

    fn verify_repository(&self) -> Result<&LibraryBackend> {
        state::verify_repository(self.workspace(), self.handle.as_ref())
    }

    fn with_backend<T>(
        &self,
        operation: Operation,
        f: impl FnOnce(&dyn RefBackend) -> Result<T>,
    ) -> Result<T> {
        match self.routing.route(operation) {
            Route::Library => f(self.verify_repository()?),
            Route::Cli => {
                if !self.has_git_repo()? {
                    return Err(Error::InvalidState {
                        path: self.workspace().to_path_buf(),
                    });
                }
                f(&CliBackend::new(&self.launcher))
            }
        }
    }

    // ------------------------------------------------------------------
    // Repository lifecycle
    // ------------------------------------------------------------------

    /// Create an empty repository in the working tree.
    pub fn init(&mut self) -> Result<()> {
        if self.has_git_repo()? {
            return Err(Error::AlreadyInitialized {
                path: self.workspace().to_path_buf(),
            });
        }
        self.handle = Some(LibraryBackend::init(self.workspace())?);
        Ok(())
    }

    /// Delete the working tree and clone `remote` into it from scratch.
    ///
    /// Cloning never merges into an existing directory.
    pub fn clone(&mut self, remote: &RemoteConfig) -> Result<()> {
        self.console(format!("Cloning repository {}", remote.name));
        let url = remote.first_url()?.to_string();

        self.handle = None;
        let workspace = self.workspace().to_path_buf();
        scm_fs::io::remove_tree(&workspace).map_err(|source| {
            self.console("Failed to clean up workspace");
            Error::WorkspaceCleanup {
                path: workspace.clone(),
                source,
            }
        })?;

        let backend = LibraryBackend::clone_from(&url, &remote.name, &workspace)
            .map_err(|e| e.context(format!("Could not clone {url}")))?;
        tracing::debug!(url = %url, path = %workspace.display(), "Cloned repository");
        self.handle = Some(backend);
        Ok(())
    }

    pub fn has_git_repo(&self) -> Result<bool> {
        state::has_repository(self.workspace())
    }

    /// Whether a repository exists at `git_dir`, relative to the working tree.
    pub fn has_git_repo_at(&self, git_dir: &str) -> Result<bool> {
        state::has_repository_at(self.workspace(), git_dir)
    }

    /// Whether the repository at `git_dir` (default: the working tree's) is bare.
    pub fn is_bare_repository(&self, git_dir: Option<&str>) -> Result<bool> {
        state::is_bare(&self.launcher, git_dir)
    }

    // ------------------------------------------------------------------
    // Remote synchronization
    // ------------------------------------------------------------------

    /// `git fetch -t [repository [refspec]]`.
    ///
    /// A refspec without a repository is dropped.
    pub fn fetch(&self, repository: Option<&str>, refspec: Option<&str>) -> Result<()> {
        self.console(match repository {
            Some(repo) => format!("Fetching upstream changes from {repo}"),
            None => "Fetching upstream changes".to_string(),
        });

        let mut args = vec!["fetch", "-t"];
        match (repository, refspec) {
            (Some(repo), refspec) => {
                args.push(repo);
                args.extend(refspec);
            }
            (None, Some(refspec)) => {
                tracing::debug!(refspec = %refspec, "Ignoring refspec without repository");
            }
            (None, None) => {}
        }
        self.launcher.launch(&args)?;
        Ok(())
    }

    /// Fetch from the remote's first URL with its first ref-spec.
    pub fn fetch_remote(&self, remote: &RemoteConfig) -> Result<()> {
        self.fetch(Some(remote.first_url()?), remote.first_refspec())
    }

    /// Push to the remote's first URL. Output is not parsed; only the exit
    /// status counts.
    pub fn push(&self, remote: &RemoteConfig, refspec: Option<&str>) -> Result<()> {
        let mut args = vec!["push", remote.first_url()?];
        args.extend(refspec);
        self.launcher.launch(&args)?;
        Ok(())
    }

    /// `git remote prune <name>`.
    pub fn prune(&self, remote: &RemoteConfig) -> Result<()> {
        self.launcher.launch(&["remote", "prune", remote.name.as_str()])?;
        Ok(())
    }

    /// Configured remotes: `preferred` (or the configured default) if present,
    /// else the first one listed.
    pub fn get_default_remote(&self, preferred: Option<&str>) -> Result<String> {
        let output = self.launcher.launch(&["remote"])?;
        let preferred = preferred.unwrap_or(&self.default_remote);
        parse::choose_default_remote(&parse::parse_remotes(&output), preferred)
    }

    pub fn get_remote_url(&self, name: &str) -> Result<String> {
        let key = format!("remote.{name}.url");
        self.config_get(&[], &key)
    }

    pub fn set_remote_url(&self, name: &str, url: &str) -> Result<()> {
        let key = format!("remote.{name}.url");
        self.launcher.launch(&["config", key.as_str(), url])?;
        Ok(())
    }

    /// Read a remote's URL from another repository (`git_dir` is its `.git`).
    pub fn get_remote_url_in(&self, name: &str, git_dir: &str) -> Result<String> {
        let key = format!("remote.{name}.url");
        self.config_get(&[format!("--git-dir={git_dir}")], &key)
    }

    /// Set a remote's URL in another repository (`git_dir` is its `.git`).
    pub fn set_remote_url_in(&self, name: &str, url: &str, git_dir: &str) -> Result<()> {
        let git_dir = format!("--git-dir={git_dir}");
        let key = format!("remote.{name}.url");
        self.launcher
            .launch(&[git_dir.as_str(), "config", key.as_str(), url])?;
        Ok(())
    }

    fn config_get(&self, prefix: &[String], key: &str) -> Result<String> {
        let mut args: Vec<&str> = prefix.iter().map(String::as_str).collect();
        args.extend(["config", "--get", key]);
        let output = self.launcher.launch(&args)?;
        Ok(parse::first_line(&output)?.unwrap_or_default().to_string())
    }

    // ------------------------------------------------------------------
    // Working tree
    // ------------------------------------------------------------------

    pub fn reset(&self, hard: bool) -> Result<()> {
        if hard {
            self.console("Resetting workspace (git reset --hard)");
            self.launcher.launch(&["reset", "--hard"])?;
        } else {
            self.console("Resetting workspace (git reset)");
            self.launcher.launch(&["reset"])?;
        }
        Ok(())
    }

    /// Hard reset, then remove untracked and ignored files and directories.
    ///
    /// Always done with the `git` executable; the library's clean does not
    /// cope with broken symlinks and permission quirks.
    pub fn clean(&self) -> Result<()> {
        self.verify_repository()?;
        self.reset(true)?;
        self.console("Cleaning workspace (git clean -dfx)");
        self.launcher.launch(&["clean", "-dfx"])?;
        Ok(())
    }

    pub fn checkout(&self, commitish: &str) -> Result<()> {
        self.checkout_branch(None, commitish)
    }

    /// Check out `commitish`, optionally as the (re)created branch `branch`.
    ///
    /// The working tree is first force-checked-out detached at `commitish` so
    /// an existing branch of the same name can be replaced.
    pub fn checkout_branch(&self, branch: Option<&str>, commitish: &str) -> Result<()> {
        let describe = || {
            format!(
                "Could not checkout {} with start point {commitish}",
                branch.unwrap_or("(detached)")
            )
        };
        self.with_backend(Operation::SwitchBranch, |backend| {
            self.launcher.launch(&["checkout", "-f", commitish])?;
            match branch {
                Some(name) => backend.switch_to_new_branch(name, commitish),
                None => Ok(()),
            }
        })
        .map_err(|e| e.context(describe()))
    }

    pub fn merge(&self, rev_spec: &str) -> Result<()> {
        self.launcher
            .launch(&["merge", rev_spec])
            .map_err(|e| e.context(format!("Could not merge {rev_spec}")))?;
        Ok(())
    }

    pub fn add(&self, file_pattern: &str) -> Result<()> {
        self.with_backend(Operation::Stage, |backend| backend.stage(file_pattern))
    }

    /// Commit the index; identity comes from the environment map.
    pub fn commit(&self, message: &str) -> Result<()> {
        let identity = CommitIdentity::from_env(self.environment());
        self.commit_as(message, &identity)
    }

    pub fn commit_as(&self, message: &str, identity: &CommitIdentity) -> Result<()> {
        self.with_backend(Operation::Commit, |backend| backend.commit(message, identity))
    }

    /// `git commit -F <file>`.
    pub fn commit_file(&self, file: &Path) -> Result<()> {
        let path = file.to_string_lossy();
        self.launcher
            .launch(&["commit", "-F", &*path])
            .map_err(|e| e.context(format!("Cannot commit {}", file.display())))?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Branches
    // ------------------------------------------------------------------

    pub fn get_branches(&self) -> Result<Vec<Branch>> {
        self.list_branches(ListMode::All)
    }

    pub fn get_remote_branches(&self) -> Result<Vec<Branch>> {
        self.list_branches(ListMode::Remote)
    }

    fn list_branches(&self, mode: ListMode) -> Result<Vec<Branch>> {
        let branches = self.with_backend(Operation::ListBranches, |backend| backend.list_branches(mode))?;
        for branch in &branches {
            self.console(format!("Branch in repo: {}", branch.name));
        }
        Ok(branches)
    }

    /// Branches (local and remote) whose history contains `revspec`.
    pub fn get_branches_containing(&self, revspec: &str) -> Result<Vec<Branch>> {
        let output = self.launcher.launch(&["branch", "-a", "--contains", revspec])?;
        let cli = CliBackend::new(&self.launcher);
        parse::parse_branches(&output, |name| cli.resolve(name))
    }

    pub fn branch(&self, name: &str) -> Result<()> {
        self.with_backend(Operation::CreateBranch, |backend| backend.create_branch(name))
    }

    pub fn delete_branch(&self, name: &str) -> Result<()> {
        self.with_backend(Operation::DeleteBranch, |backend| backend.delete_branch(name))
    }

    pub fn current_branch(&self) -> Result<Option<String>> {
        self.with_backend(Operation::CurrentBranch, |backend| backend.current_branch())
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Create or move an annotated tag at HEAD.
    pub fn tag(&self, name: &str, message: &str) -> Result<()> {
        let name = parse::normalize_tag_name(name);
        self.launcher
            .launch(&["tag", "-a", "-f", "-m", message, name.as_str()])
            .map_err(|e| e.context(format!("Could not apply tag {name}")))?;
        Ok(())
    }

    pub fn tag_exists(&self, name: &str) -> Result<bool> {
        let name = parse::normalize_tag_name(name);
        let output = self.launcher.launch(&["tag", "-l", name.as_str()])?;
        Ok(output.trim() == name)
    }

    pub fn delete_tag(&self, name: &str) -> Result<()> {
        let name = parse::normalize_tag_name(name);
        self.launcher
            .launch(&["tag", "-d", name.as_str()])
            .map_err(|e| e.context(format!("Could not delete tag {name}")))?;
        Ok(())
    }

    pub fn get_tag_names(&self, pattern: &str) -> Result<BTreeSet<String>> {
        let output = self
            .launcher
            .launch(&["tag", "-l", pattern])
            .map_err(|e| e.context("Error retrieving tag names"))?;
        Ok(parse::parse_tag_names(&output))
    }

    /// Tags pointing at the commit `rev` resolves to, in no particular order.
    pub fn get_tags_on_commit(&self, rev: &str) -> Result<Vec<Tag>> {
        self.with_backend(Operation::TagsOnCommit, |backend| backend.tags_on_commit(rev))
    }

    // ------------------------------------------------------------------
    // History queries
    // ------------------------------------------------------------------

    /// Resolve `rev` to one object id; empty output resolves to `None`.
    pub fn rev_parse(&self, rev: &str) -> Result<Option<ObjectId>> {
        let output = self.launcher.launch(&["rev-parse", rev])?;
        parse::parse_object_id_line(&output)
    }

    /// `git describe --tags <commitish>`.
    pub fn describe(&self, commitish: &str) -> Result<String> {
        let output = self.launcher.launch(&["describe", "--tags", commitish])?;
        parse::first_line(&output)?
            .map(str::to_string)
            .ok_or_else(|| Error::EmptyResult {
                command: format!("git describe --tags {commitish}"),
            })
    }

    /// Best common ancestor of `a` and `b`.
    ///
    /// A failing `merge-base` (no common ancestor, unknown object) is `None`,
    /// not an error.
    pub fn merge_base(&self, a: &ObjectId, b: &ObjectId) -> Result<Option<ObjectId>> {
        let (a, b) = (a.to_string(), b.to_string());
        let output = match self.launcher.launch(&["merge-base", a.as_str(), b.as_str()]) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(error = %e, "No merge base");
                return Ok(None);
            }
        };
        output
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::parse)
            .transpose()
            .map_err(|e: Error| e.context("Error parsing merge base"))
    }

    pub fn rev_list(&self, extra_args: &[&str]) -> Result<Vec<ObjectId>> {
        let mut args = vec!["rev-list"];
        args.extend_from_slice(extra_args);
        let output = self.launcher.launch(&args)?;
        parse::parse_rev_list(&output)
    }

    pub fn rev_list_all(&self) -> Result<Vec<ObjectId>> {
        self.rev_list(&["--all"])
    }

    pub fn rev_list_branch(&self, branch: &str) -> Result<Vec<ObjectId>> {
        self.rev_list(&[branch])
    }

    pub fn is_commit_in_repo(&self, sha1: &str) -> Result<bool> {
        self.with_backend(Operation::CommitLookup, |backend| Ok(backend.has_commit(sha1)))
    }

    /// Raw `%H#%ct` log of every ref.
    pub fn get_all_log_entries(&self, branch: &str) -> Result<String> {
        self.launcher
            .launch(&["log", "--all", "--pretty=format:%H#%ct", branch])
    }

    pub fn log_entries(&self, branch: &str) -> Result<Vec<LogEntry>> {
        parse::parse_log_entries(&self.get_all_log_entries(branch)?)
    }

    /// Stream the raw what-changed log of `from..to` into `sink`.
    pub fn changelog(&self, from: &str, to: &str, sink: &mut dyn Write) -> Result<()> {
        let range = format!("{from}..{to}");
        self.launcher
            .launch_to(
                &[
                    "log",
                    "--raw",
                    "--no-merges",
                    "--no-abbrev",
                    "-M",
                    "--pretty=raw",
                    range.as_str(),
                ],
                sink,
            )
            .map_err(|e| e.context("Error performing git whatchanged"))
    }

    /// A single commit in what-changed format, one element per line.
    pub fn show_revision(&self, revision: &Revision) -> Result<Vec<String>> {
        let Some(sha1) = revision.sha1 else {
            return Ok(Vec::new());
        };
        let sha1 = sha1.to_string();
        let output = self.launcher.launch(&[
            "show",
            "--no-abbrev",
            "--format=raw",
            "-M",
            "--raw",
            sha1.as_str(),
        ])?;
        Ok(output.lines().map(str::to_string).collect())
    }

    // ------------------------------------------------------------------
    // Trees and submodules
    // ------------------------------------------------------------------

    /// Top-level entries of `tree_ish`; nested paths show up as their tree.
    pub fn ls_tree(&self, tree_ish: &str) -> Result<Vec<IndexEntry>> {
        let output = self.launcher.launch(&["ls-tree", tree_ish])?;
        parse::parse_ls_tree(&output)
    }

    /// Gitlink entries anywhere in `tree_ish`.
    ///
    /// `ls-tree -r` descends into subtrees, so `libs/foo` is listed, but not
    /// into the gitlinks themselves.
    pub fn get_submodules(&self, tree_ish: &str) -> Result<Vec<IndexEntry>> {
        let output = self.launcher.launch(&["ls-tree", "-r", tree_ish])?;
        let mut entries = parse::parse_ls_tree(&output)?;
        entries.retain(IndexEntry::is_submodule);
        Ok(entries)
    }

    /// Whether the working tree has a `.gitmodules` file.
    pub fn has_git_modules(&self) -> Result<bool> {
        let gitmodules = self.workspace().join(ScmPath::GitModules.as_str());
        Ok(scm_fs::io::probe_exists(&gitmodules)?)
    }

    /// `.gitmodules` exists and `tree_ish` has at least one submodule.
    pub fn has_git_modules_at(&self, tree_ish: &str) -> Result<bool> {
        Ok(self.has_git_modules()? && !self.get_submodules(tree_ish)?.is_empty())
    }

    pub fn submodule_init(&self) -> Result<()> {
        self.launcher.launch(&["submodule", "init"])?;
        Ok(())
    }

    pub fn submodule_sync(&self) -> Result<()> {
        self.launcher.launch(&["submodule", "sync"])?;
        Ok(())
    }

    pub fn submodule_update(&self, recursive: bool) -> Result<()> {
        let mut args = vec!["submodule", "update"];
        if recursive {
            args.extend(["--init", "--recursive"]);
        }
        self.launcher.launch(&args)?;
        Ok(())
    }

    pub fn submodule_clean(&self, recursive: bool) -> Result<()> {
        let mut args = vec!["submodule", "foreach"];
        if recursive {
            args.push("--recursive");
        }
        args.push("git clean -fdx");
        self.launcher.launch(&args)?;
        Ok(())
    }

    pub fn get_submodule_url(&self, name: &str) -> Result<String> {
        let key = format!("submodule.{name}.url");
        self.config_get(&[], &key)
    }

    pub fn set_submodule_url(&self, name: &str, url: &str) -> Result<()> {
        let key = format!("submodule.{name}.url");
        self.launcher.launch(&["config", key.as_str(), url])?;
        Ok(())
    }
}
