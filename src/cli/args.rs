//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Versioned expert decision trees: author, validate and evaluate
#[derive(Parser, Debug)]
#[command(name = "treexpert")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding a local .treexpert.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage tree kinds
    Kind {
        #[command(subcommand)]
        command: KindCommands,
    },

    /// Submit and inspect decision trees
    Tree {
        #[command(subcommand)]
        command: TreeCommands,
    },

    /// Evaluate entities against a tree
    Decide {
        /// JSON file with one entity, or a list with --batch
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Tree kind (default: configured, else first)
        #[arg(short, long)]
        kind: Option<String>,
        /// Tree version as major.minor (default: current)
        #[arg(long = "tree-version")]
        tree_version: Option<String>,
        /// File holds a list of entities
        #[arg(short, long)]
        batch: bool,
        /// Print full criteria
        #[arg(short, long)]
        full: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum KindCommands {
    /// Create a tree kind
    Add {
        name: String,
        /// Free-text description
        #[arg(short = 'm', long, default_value = "")]
        description: String,
    },

    /// List tree kinds
    List,
}

#[derive(Subcommand, Debug)]
pub enum TreeCommands {
    /// Validate a submission and store it as the new current tree
    Submit {
        /// Submission JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Tree kind (default: configured, else first)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Show a built tree
    Show {
        /// Tree kind (default: configured, else first)
        #[arg(short, long)]
        kind: Option<String>,
        /// Tree version as major.minor (default: current)
        #[arg(long = "tree-version")]
        tree_version: Option<String>,
        /// Print JSON instead of a tree
        #[arg(long)]
        json: bool,
    },

    /// List versions of a kind
    Versions {
        /// Tree kind (default: configured, else first)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Record a version without a tree
    AddVersion {
        /// Version as major.minor
        #[arg(value_name = "VERSION")]
        label: String,
        /// Tree kind (default: configured, else first)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Remove the stored elements of a version
    Purge {
        /// Version as major.minor
        #[arg(value_name = "VERSION")]
        label: String,
        /// Tree kind (default: configured, else first)
        #[arg(short, long)]
        kind: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a config template
    Template,

    /// Show config paths
    Path,
}
