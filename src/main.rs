//! sitegraph - dependency tracking and rebuild ordering for static site builds.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use sitegraph::cli::{self, Cli, Commands, order::OrderView};
use sitegraph::config::GraphConfig;
use sitegraph::{logger, state};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    state::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = GraphConfig::load(&cli)?;

    match &cli.command {
        Commands::Order {
            unfiltered,
            collections,
        } => cli::order::print_order(&config, OrderView::from_flags(*unfiltered, *collections)),
        Commands::Affected { paths, .. } => cli::affected::print_affected(&config, paths),
        Commands::Deps {
            node,
            dependants,
            no_layouts,
        } => cli::deps::print_deps(&config, node, *dependants, *no_layouts),
        Commands::Watch { .. } => cli::watch::watch_project(&config),
    }
}
