//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Reorder a two-level category tree and persist the new layout
#[derive(Parser, Debug)]
#[command(name = "catreorder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: ./.catreorder.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the category tree
    Tree,

    /// Drop a category onto a target and persist the new layout
    #[command(name = "move")]
    Move {
        /// Id of the dragged category
        dragged: String,
        /// Drop target: `<id>` (row), `parent-<id>` (drop zone) or `root`.
        /// Omit to simulate a release outside any target.
        target: Option<String>,
        /// Print the resulting tree and change-set without pushing
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the reorder change-set for the current tree as JSON
    Payload,

    /// Verify sibling orders are dense 1..n
    Check,

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
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print config template
    Template,

    /// Show config paths
    Path,
}
