//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Edit outline documents: one item per line, nesting by indentation
#[derive(Parser, Debug)]
#[command(name = "rstree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: $XDG_CONFIG_HOME/rstree/rstree.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the default outline to a new document
    New {
        /// Target document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Overwrite an existing document
        #[arg(short, long)]
        force: bool,
    },

    /// Print the document as a tree
    Show {
        /// Document to show
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Prefix every item with its row path
        #[arg(short, long)]
        paths: bool,
    },

    /// Re-indent a document in canonical form
    Normalize {
        /// Document to read
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Change the value of an item
    Set {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Row path of the item, e.g. 0/2/1
        path: String,
        /// New value
        value: String,
    },

    /// Insert an empty item below the given one
    InsertRow {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Row path of the item, e.g. 0/2/1
        path: String,
    },

    /// Insert an empty first child into the given item
    InsertChild {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Row path of the parent item (default: top level)
        path: Option<String>,
    },

    /// Remove an item with all its children
    RemoveRow {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Row path of the item, e.g. 0/2/1
        path: String,
    },

    /// Move items under a new parent, keeping their order
    Move {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Row paths of the items to move
        #[arg(required = true)]
        paths: Vec<String>,
        /// Row path of the new parent (default: top level)
        #[arg(short, long)]
        to: Option<String>,
        /// Row under the new parent (default: first row, or last at top level)
        #[arg(short, long)]
        row: Option<usize>,
    },

    /// Show effective settings
    Config,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
