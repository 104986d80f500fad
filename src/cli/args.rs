//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Dependency tracking and rebuild ordering for static site builds
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: sitegraph.toml)
    #[arg(short = 'C', long, default_value = "sitegraph.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the order templates must be rendered in
    #[command(visible_alias = "o")]
    Order {
        /// Keep bracketed stage markers and the `all` collection in place
        #[arg(short, long)]
        unfiltered: bool,

        /// Only print collection names
        #[arg(short, long, conflicts_with = "unfiltered")]
        collections: bool,
    },

    /// Show which templates a set of changed files invalidates
    #[command(visible_alias = "a")]
    Affected {
        /// Changed files (relative to the project root)
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<String>,

        /// Process only the first file, like an incremental watch cycle
        #[arg(short, long)]
        incremental: bool,
    },

    /// Print the dependencies of a node
    #[command(visible_alias = "d")]
    Deps {
        /// Template path, file path or collection key
        node: String,

        /// Print dependants instead of dependencies
        #[arg(short, long)]
        dependants: bool,

        /// Hide layout nodes
        #[arg(long)]
        no_layouts: bool,
    },

    /// Watch the project and plan a rebuild for every change
    #[command(visible_alias = "w")]
    Watch {
        /// Process one changed file per build cycle
        #[arg(short, long)]
        incremental: bool,
    },
}
