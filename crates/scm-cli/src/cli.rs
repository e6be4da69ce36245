//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Drive a git working tree the way a build does
#[derive(Parser, Debug)]
#[command(name = "scm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (.toml or .json)
    #[arg(long, global = true, env = "SCM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Working tree to operate on (defaults to the current directory)
    #[arg(short = 'C', global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create an empty repository
    Init,

    /// Replace the working tree with a fresh clone
    Clone {
        /// Repository URL or path
        url: String,

        /// Name of the remote
        #[arg(long, default_value = "origin")]
        name: String,
    },

    /// Fetch changes and tags
    ///
    /// A refspec is ignored unless a repository is named.
    Fetch {
        repository: Option<String>,
        refspec: Option<String>,
    },

    /// Force-checkout a commit, optionally as a (re)created branch
    Checkout {
        commitish: String,

        /// Branch to create or reset at the commit
        #[arg(short = 'b', long)]
        branch: Option<String>,
    },

    /// List branches with the commits they point to
    Branches {
        /// Only remote-tracking branches
        #[arg(long)]
        remote: bool,

        /// Only branches containing this revision
        #[arg(long, value_name = "REV")]
        contains: Option<String>,
    },

    /// Create or move an annotated tag at HEAD
    Tag {
        name: String,

        /// Tag message
        #[arg(short, long)]
        message: String,
    },

    /// Print whether a tag exists
    TagExists { name: String },

    /// Resolve a revision to a full object id
    RevParse { rev: String },

    /// Describe a commit using the nearest tag
    Describe { commitish: String },

    /// Print the best common ancestor of two revisions
    MergeBase { a: String, b: String },

    /// Hard reset and remove untracked and ignored files
    Clean,

    /// Print the remote a build should use
    DefaultRemote {
        /// Remote to prefer when it exists
        #[arg(long)]
        preferred: Option<String>,
    },

    /// Initialise submodules and point their URLs at the superproject's origin
    SetupSubmodules {
        /// Remote whose URL anchors the submodules
        #[arg(long)]
        remote: Option<String>,
    },
}
