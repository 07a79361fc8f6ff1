//! md5db CLI Binary
//!
//! Command-line interface for the md5db file digest catalog.

use anyhow::Context;
use clap::Parser;
use md5db::config::ConfigLoader;
use md5db::logging::init_logging;
use md5db::tooling::cli::{Cli, CliContext};
use std::process;

fn run(cli: &Cli) -> anyhow::Result<String> {
    let mut config =
        ConfigLoader::resolve(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply_logging_overrides(&mut config.logging);

    // Held until return so queued log lines are flushed.
    let _log_guard = init_logging(Some(&config.logging)).context("failed to initialize logging")?;

    let context = CliContext::from_config(config, cli.store.clone())
        .context("failed to resolve store path")?;
    let output = context
        .execute(&cli.command)
        .with_context(|| format!("store {}", context.store_path().display()))?;
    Ok(output)
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
