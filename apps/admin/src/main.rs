pub mod args;
pub mod commands;

use crate::args::Cli;
use anyhow::{Context, Result};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        flagkit::load_config(cli.config.as_deref()).context("Critical: Configuration is malformed")?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    if cli.verbose {
        config.logging.level = "debug".to_owned();
    }
    // One-shot process: writes must land before exit.
    config.storage.write_behind = false;

    let _log = flagkit::init_logging(env!("CARGO_BIN_NAME"), &config)?;

    let flags = flagkit::bootstrap(&config)?;
    commands::run(&flags, cli.command, &mut std::io::stdout().lock())
}
