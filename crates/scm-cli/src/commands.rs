//! Command implementations
//!
//! Results go to stdout, one value per line; progress goes to stderr
//! through [`ConsoleListener`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use scm_fs::NormalizedPath;
use scm_git::{Branch, GitApi, GitSettings, RemediationOutcome, RemoteConfig};

use crate::console::ConsoleListener;
use crate::error::{CliError, Result};

/// Settings and working tree shared by every command.
pub struct Context {
    workspace: PathBuf,
    settings: GitSettings,
}

impl Context {
    pub fn new(workspace: PathBuf, config: Option<&Path>) -> Result<Self> {
        let settings = match config {
            Some(path) => GitSettings::load(&NormalizedPath::new(path))?,
            None => GitSettings::default(),
        };
        Ok(Self {
            workspace,
            settings,
        })
    }

    fn api(&self) -> Result<GitApi> {
        let env: BTreeMap<String, String> = std::env::vars().collect();
        Ok(GitApi::with_settings(
            &self.settings,
            &self.workspace,
            Arc::new(ConsoleListener),
            env,
        )?)
    }
}

fn done(message: impl std::fmt::Display) {
    eprintln!("{} {}", "OK".green().bold(), message);
}

pub fn run_init(ctx: &Context) -> Result<()> {
    ctx.api()?.init()?;
    done(format!("Initialized repository in {}", ctx.workspace.display()));
    Ok(())
}

pub fn run_clone(ctx: &Context, name: &str, url: &str) -> Result<()> {
    ctx.api()?.clone(&RemoteConfig::new(name, url))?;
    done(format!("Cloned {} into {}", url.cyan(), ctx.workspace.display()));
    Ok(())
}

pub fn run_fetch(ctx: &Context, repository: Option<&str>, refspec: Option<&str>) -> Result<()> {
    ctx.api()?.fetch(repository, refspec)?;
    Ok(())
}

pub fn run_checkout(ctx: &Context, commitish: &str, branch: Option<&str>) -> Result<()> {
    ctx.api()?.checkout_branch(branch, commitish)?;
    match branch {
        Some(branch) => done(format!("On branch {} at {}", branch.cyan(), commitish.yellow())),
        None => done(format!("Detached at {}", commitish.yellow())),
    }
    Ok(())
}

pub fn run_branches(ctx: &Context, remote: bool, contains: Option<&str>) -> Result<()> {
    let api = ctx.api()?;
    let branches: Vec<Branch> = match contains {
        Some(rev) => api.get_branches_containing(rev)?,
        None if remote => api.get_remote_branches()?,
        None => api.get_branches()?,
    };
    for branch in branches {
        println!("{} {}", branch.sha1, branch.name);
    }
    Ok(())
}

pub fn run_tag(ctx: &Context, name: &str, message: &str) -> Result<()> {
    ctx.api()?.tag(name, message)?;
    done(format!("Tagged HEAD as {}", name.cyan()));
    Ok(())
}

pub fn run_tag_exists(ctx: &Context, name: &str) -> Result<()> {
    println!("{}", ctx.api()?.tag_exists(name)?);
    Ok(())
}

pub fn run_rev_parse(ctx: &Context, rev: &str) -> Result<()> {
    if let Some(id) = ctx.api()?.rev_parse(rev)? {
        println!("{id}");
    }
    Ok(())
}

pub fn run_describe(ctx: &Context, commitish: &str) -> Result<()> {
    println!("{}", ctx.api()?.describe(commitish)?);
    Ok(())
}

pub fn run_merge_base(ctx: &Context, a: &str, b: &str) -> Result<()> {
    let api = ctx.api()?;
    let resolve = |rev: &str| {
        api.rev_parse(rev)?
            .ok_or_else(|| CliError::user(format!("Cannot resolve revision {rev}")))
    };
    let (a, b) = (resolve(a)?, resolve(b)?);
    if let Some(base) = api.merge_base(&a, &b)? {
        println!("{base}");
    }
    Ok(())
}

pub fn run_clean(ctx: &Context) -> Result<()> {
    ctx.api()?.clean()?;
    Ok(())
}

pub fn run_default_remote(ctx: &Context, preferred: Option<&str>) -> Result<()> {
    println!("{}", ctx.api()?.get_default_remote(preferred)?);
    Ok(())
}

pub fn run_setup_submodules(ctx: &Context, remote: Option<&str>) -> Result<()> {
    let api = ctx.api()?;
    let remote = match remote {
        Some(remote) => remote.to_string(),
        None => api.get_default_remote(None)?,
    };
    match api.setup_submodule_urls_for_remote(&remote)? {
        RemediationOutcome::Rewritten(paths) => {
            for path in &paths {
                println!("{path}");
            }
            done(format!("Rewrote {} submodule URL(s)", paths.len()));
        }
        RemediationOutcome::Bare => done("Origin is bare; submodule URLs left as configured"),
        RemediationOutcome::Unresolvable => {
            done("Remote URL is not a URI; submodule URLs left as configured")
        }
        RemediationOutcome::RemoteUrlUnavailable => {
            return Err(CliError::user(format!("Remote {remote} has no URL")));
        }
        RemediationOutcome::Failed { reason, .. } => {
            return Err(CliError::user(format!("Submodule URLs not fixed: {reason}")));
        }
    }
    Ok(())
}
