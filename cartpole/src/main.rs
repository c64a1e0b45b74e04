//! # Cart-pole
//!
//! Entry point for the `cartpole` binary. Parses the command line, sets up
//! logging and hands the resulting configuration to [`cartpole::run`].

use anyhow::Result;
use cartpole::Cli;
use clap::Parser;
use tracing::Level;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = cli.experiment()?;
    let output = cartpole::run(&config)?;
    if let Some(path) = &cli.report {
        cartpole::write_report(&output.report, path)?;
    }
    Ok(())
}
