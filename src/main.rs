use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use dedupe_records::config::Config;
use dedupe_records::core::Strategy;
use dedupe_records::terminal::ConsoleReporter;

/// Remove duplicate record blocks from a data file, keeping the first
/// occurrence of every name.
#[derive(Parser, Debug)]
#[command(name = "dedupe-records", version, about)]
struct Cli {
    /// File to deduplicate in place [default: src/data/apps.ts]
    path: Option<PathBuf>,

    /// Configuration file [default: dedupe.toml, if present]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How duplicate blocks are located
    #[arg(short, long, value_enum)]
    strategy: Option<Strategy>,

    /// Report what would be removed without touching the file
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.path {
        config.target = path;
    }
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    if let Some(out) = cli.write_config {
        config.save(&out)?;
        println!("Wrote {}", out.display());
        return Ok(());
    }

    info!("deduplicating {} ({:?})", config.target.display(), config.strategy);

    let mut reporter = ConsoleReporter::stdout(cli.json);
    config
        .deduplicator()?
        .run(&config.target, &mut reporter)
        .with_context(|| format!("failed to deduplicate {}", config.target.display()))?;

    Ok(())
}
