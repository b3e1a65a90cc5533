//! Ingest command - stream JSON readings into the hot store
//!
//! # Usage
//!
//! ```bash
//! strata ingest < readings.jsonl
//! strata ingest --input readings.jsonl
//! ```
//!
//! Reads one JSON reading per line until EOF, Ctrl-C or SIGTERM, then drains
//! the pipeline and prints a summary. With `failure_policy = "dead_letter"`
//! failed batches are appended to `dead_letter_path` as JSON lines.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use strata_config::{Config, FailurePolicy};
use strata_ingest::{
    BatchWriter, ClickHouseHotStore, DuplicateFilter, FailedBatch, FailedBatchSink, IngestOutcome,
    IngestPipeline, MetricsSnapshot, ReadingValidator,
};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Ingest command arguments
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// JSON-lines file to read (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,
}

/// What the reader saw, by outcome
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct FeedSummary {
    lines: u64,
    accepted: u64,
    duplicates: u64,
    rejected: u64,
    interrupted: bool,
}

/// Run the ingest command
pub async fn run(args: IngestArgs, config: Config) -> Result<()> {
    let ingest = &config.ingest;

    let writer: Arc<dyn BatchWriter> = Arc::new(ClickHouseHotStore::from_config(
        &config.stores.hot,
        config.stores.hot_table(),
    ));

    let (failures, dead_letter) = match ingest.failure_policy {
        FailurePolicy::Drop => (FailedBatchSink::Drop, None),
        FailurePolicy::DeadLetter => {
            let (tx, rx) = mpsc::channel(ingest.dead_letter_capacity.max(1));
            let path = PathBuf::from(&ingest.dead_letter_path);
            let task = tokio::spawn(write_dead_letters(rx, path));
            (FailedBatchSink::DeadLetter(tx), Some(task))
        }
    };

    let pipeline = IngestPipeline::new(
        ingest,
        ReadingValidator::from_config(ingest),
        DuplicateFilter::new(ingest.dedup_capacity),
        writer,
        failures,
    );

    info!(
        table = %config.stores.hot_table(),
        batch_size = ingest.batch_size,
        flush_interval_ms = ingest.flush_interval.as_millis() as u64,
        failure_policy = ?ingest.failure_policy,
        "ingestion started"
    );

    let cancel = CancellationToken::new();
    let timer = pipeline.spawn_timer(cancel.clone());

    let fed = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .await
                .with_context(|| format!("failed to open input: {}", path.display()))?;
            feed(&pipeline, BufReader::new(file)).await
        }
        None => feed(&pipeline, BufReader::new(tokio::io::stdin())).await,
    };

    // timer must be stopped before shutdown
    cancel.cancel();
    if let Err(e) = timer.await {
        warn!(error = %e, "flush timer task failed");
    }

    let report = pipeline
        .shutdown(ingest.shutdown_timeout)
        .await
        .context("ingestion did not drain")?;

    // last sender lives in the pipeline
    drop(pipeline);
    if let Some(task) = dead_letter {
        match task.await {
            Ok(Ok(batches)) if batches > 0 => {
                warn!(batches, path = %ingest.dead_letter_path, "failed batches dead-lettered");
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!(error = %e, "dead-letter writer failed"),
            Err(e) => error!(error = %e, "dead-letter task panicked"),
        }
    }

    let fed = fed?;
    if fed.interrupted {
        info!(lines = fed.lines, "input interrupted");
    }
    eprintln!("{}", summary(&fed, &report.metrics));

    Ok(())
}

/// Offer every non-blank line until EOF or a shutdown signal
async fn feed<R>(pipeline: &IngestPipeline, reader: R) -> Result<FeedSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = FeedSummary::default();

    let interrupt = wait_for_shutdown();
    tokio::pin!(interrupt);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read input")?,
            _ = &mut interrupt => {
                summary.interrupted = true;
                break;
            }
        };

        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        summary.lines += 1;

        match pipeline.ingest_json(&line).await {
            IngestOutcome::Accepted => summary.accepted += 1,
            IngestOutcome::Duplicate => summary.duplicates += 1,
            IngestOutcome::Rejected(rejection) => {
                summary.rejected += 1;
                warn!(line = summary.lines, reason = rejection.kind(), error = %rejection, "reading rejected");
            }
            IngestOutcome::Closed => break,
        }
    }

    Ok(summary)
}

/// Append failed batches to a JSON-lines file until the channel closes
///
/// Returns the number of batches written.
async fn write_dead_letters(mut rx: mpsc::Receiver<FailedBatch>, path: PathBuf) -> Result<u64> {
    let file = open_append(&path).await?;
    let mut out = BufWriter::new(file);
    let mut batches = 0u64;

    while let Some(batch) = rx.recv().await {
        let mut line = serde_json::to_vec(&batch).context("failed to encode failed batch")?;
        line.push(b'\n');
        out.write_all(&line)
            .await
            .with_context(|| format!("failed to write dead letter: {}", path.display()))?;
        out.flush().await?;

        batches += 1;
        debug!(size = batch.readings.len(), reason = ?batch.reason, "batch dead-lettered");
    }

    Ok(batches)
}

async fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("failed to open dead-letter file: {}", path.display()))
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn summary(fed: &FeedSummary, metrics: &MetricsSnapshot) -> String {
    format!(
        "{} line(s): {} accepted, {} duplicate(s), {} rejected\n\
         {} row(s) written in {} batch(es), {} write failure(s), {} batch(es) dropped",
        fed.lines,
        fed.accepted,
        fed.duplicates,
        fed.rejected,
        metrics.rows_written,
        metrics.batches_flushed,
        metrics.write_failures,
        metrics.batches_dropped,
    )
}

#[cfg(test)]
#[path = "ingest_test.rs"]
mod ingest_test;
