//! Strata - sensor ingestion and tiered queries
//!
//! # Usage
//!
//! ```bash
//! # Ingest JSON lines from stdin until EOF or Ctrl-C
//! strata ingest < readings.jsonl
//! strata --config configs/strata.toml ingest --input readings.jsonl
//!
//! # Query aggregates; the tier is picked from the range length
//! strata query --start "2024-03-01 10:00:00" --end "2024-03-01 10:05:00"
//! strata query --start "2024-02-01 00:00:00" --end "2024-03-01 00:00:00" \
//!     --metric temperature --device R001 --format csv
//! ```

mod cmd;
mod output;

use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use strata_config::{LogConfig, LogFormat, LogOutput};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Strata - sensor ingestion and tiered queries
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate, deduplicate and batch readings into the hot store
    Ingest(cmd::ingest::IngestArgs),

    /// Aggregate readings per device from the matching storage tier
    Query(cmd::query::QueryArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cmd::load_config(cli.config.as_deref())?;
    init_logging(&config.log, cli.log_level.as_deref())?;

    match cli.command {
        Command::Ingest(args) => cmd::ingest::run(args, config).await,
        Command::Query(args) => cmd::query::run(args, config).await,
    }
}

/// Initialize the tracing subscriber from `[log]`
///
/// Level: CLI flag > config file > "info".
fn init_logging(log: &LogConfig, cli_level: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_new(log.filter_directives(cli_level))
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let (writer, ansi) = match &log.output {
        LogOutput::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        LogOutput::Stdout => (BoxMakeWriter::new(std::io::stdout), true),
        LogOutput::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file: {}", path))?;
            (BoxMakeWriter::new(Arc::new(file)), false)
        }
    };

    let layer = match log.format {
        LogFormat::Console => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    Ok(())
}
