use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use solar_noon::manager::Manager;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a synthetic dataset.
    Synth,

    /// Estimate solar noon for every dataset.
    Estimate,

    /// Remove all results.
    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.data_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Synth => mgr.synthesize()?,
        Command::Estimate => mgr.estimate()?,
        Command::Clean => mgr.clean()?,
    }

    Ok(())
}
