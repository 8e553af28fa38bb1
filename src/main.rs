use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use edu_trajectory::{CleaningConfig, clean_record_batch, read_parquet_single, write_parquet};
use log::info;

/// Clean yearly education levels in a register-style Parquet table
#[derive(Parser, Debug)]
#[command(name = "edu-trajectory")]
#[command(version)]
struct Cli {
    /// Parquet file with one row per individual and calendar year
    input: PathBuf,

    /// Parquet file to write, the input plus the cleaned level column
    output: PathBuf,

    /// JSON cleaning configuration; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match &cli.config {
        Some(path) => CleaningConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => CleaningConfig::default(),
    };
    info!("{config}");

    let start = Instant::now();

    let batch = read_parquet_single(&cli.input, None)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    info!("Loaded {} rows in {:?}", batch.num_rows(), start.elapsed());

    let outcome = clean_record_batch(&batch, &config).context("Cleaning failed")?;
    info!("{}", outcome.stats);

    write_parquet(&cli.output, &[outcome.batch])
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    info!("Finished in {:?}", start.elapsed());
    Ok(())
}
