use anyhow::{Context, Result};
use bootband::manager::Manager;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    work_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Draw bootstrap samples of the training rates.
    Resample,

    /// Build rate and level prediction bands from the model forecasts.
    Summarize,

    /// Remove generated files.
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

    let mgr = Manager::new(args.work_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Resample => mgr.create_samples()?,
        Command::Summarize => mgr.summarize_forecasts()?,
        Command::Clean => mgr.clean_outputs()?,
    }

    Ok(())
}
