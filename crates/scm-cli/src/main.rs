//! scm CLI
//!
//! Runs single operations of the scm-git command layer against a working
//! tree, the same way a build orchestrator would.

mod cli;
mod commands;
mod console;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use commands::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    tracing::debug!("Verbose mode enabled");

    let Some(command) = cli.command else {
        println!("{} git command layer for builds", "scm".green().bold());
        println!();
        println!("Run {} for available commands.", "scm --help".cyan());
        return Ok(());
    };

    let workspace = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let ctx = Context::new(workspace, cli.config.as_deref())?;
    execute_command(&ctx, command)
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init => commands::run_init(ctx),
        Commands::Clone { url, name } => commands::run_clone(ctx, &name, &url),
        Commands::Fetch {
            repository,
            refspec,
        } => commands::run_fetch(ctx, repository.as_deref(), refspec.as_deref()),
        Commands::Checkout { commitish, branch } => {
            commands::run_checkout(ctx, &commitish, branch.as_deref())
        }
        Commands::Branches { remote, contains } => {
            commands::run_branches(ctx, remote, contains.as_deref())
        }
        Commands::Tag { name, message } => commands::run_tag(ctx, &name, &message),
        Commands::TagExists { name } => commands::run_tag_exists(ctx, &name),
        Commands::RevParse { rev } => commands::run_rev_parse(ctx, &rev),
        Commands::Describe { commitish } => commands::run_describe(ctx, &commitish),
        Commands::MergeBase { a, b } => commands::run_merge_base(ctx, &a, &b),
        Commands::Clean => commands::run_clean(ctx),
        Commands::DefaultRemote { preferred } => {
            commands::run_default_remote(ctx, preferred.as_deref())
        }
        Commands::SetupSubmodules { remote } => {
            commands::run_setup_submodules(ctx, remote.as_deref())
        }
    }
}
