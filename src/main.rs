use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod clean;
mod config;
mod error;
mod io;
mod models;
mod report;

use config::CleanerPaths;
use error::CleanError;

#[derive(Parser)]
#[command(name = "velo-clean")]
#[command(about = "Clean the raw bicycle accident export for the dashboard", long_about = None)]
struct Cli {
    /// Project root holding data/raw and data/cleaned
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Raw input CSV (defaults to <root>/data/raw/accidentsVelo-full.csv)
    #[arg(long)]
    raw: Option<PathBuf>,
    /// Cleaned output CSV (defaults to <root>/data/cleaned/accidents_cleaned.csv)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Run every cleaning step but do not write the output file
    #[arg(long)]
    dry_run: bool,
    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install log subscriber")?;

    let paths = CleanerPaths::from_root(&cli.root).with_overrides(cli.raw, cli.out);
    if !cli.json {
        println!("Starting cleanup... reading {}", paths.raw.display());
    }

    let outcome = match clean::clean_file(&paths, cli.dry_run) {
        Ok(outcome) => outcome,
        Err(err @ CleanError::NotFound { .. }) => {
            return Err(anyhow::Error::new(err).context(
                "place accidentsVelo-full.csv in data/raw/ (or pass --raw) before cleaning",
            ));
        }
        Err(err) => return Err(err.into()),
    };

    if cli.json {
        let value = report::build_json(&paths.raw, &outcome);
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", report::build_summary(&paths.raw, &outcome));
    }

    Ok(())
}
