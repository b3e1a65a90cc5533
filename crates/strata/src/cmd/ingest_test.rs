use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use strata_config::IngestConfig;
use strata_ingest::{FailureReason, SensorReading, WriteError};

use super::*;

#[derive(Default)]
struct CountingWriter {
    rows: Mutex<Vec<String>>,
}

#[async_trait]
impl BatchWriter for CountingWriter {
    async fn write(&self, readings: &[SensorReading]) -> Result<u64, WriteError> {
        self.rows
            .lock()
            .unwrap()
            .extend(readings.iter().map(|r| r.data_id.clone()));
        Ok(readings.len() as u64)
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

fn pipeline(writer: Arc<CountingWriter>) -> IngestPipeline {
    let config = IngestConfig {
        batch_size: 2,
        flush_interval: Duration::from_secs(60),
        ..Default::default()
    };
    IngestPipeline::new(
        &config,
        ReadingValidator::from_config(&config),
        DuplicateFilter::new(config.dedup_capacity),
        writer,
        FailedBatchSink::Drop,
    )
}

fn line(id: &str, temperature: &str) -> String {
    format!(
        r#"{{"dataId":"{id}","robotId":"R001","sensorId":"S1","sensorType":"ENV_SENSOR","timestamp":"2024-03-01 10:00:00","metrics":{{"temperature":{temperature}}}}}"#
    )
}

#[tokio::test]
async fn test_feed_counts_outcomes() {
    let writer = Arc::new(CountingWriter::default());
    let pipeline = pipeline(writer.clone());

    let input = [
        line("d-1", "21.5"),
        String::new(),
        line("d-2", "22.0"),
        line("d-1", "21.5"),
        line("d-3", "900.0"),
        "not json".to_string(),
        line("d-4", "23.0"),
    ]
    .join("\n");

    let fed = feed(&pipeline, input.as_bytes()).await.unwrap();
    assert_eq!(
        fed,
        FeedSummary {
            lines: 6,
            accepted: 3,
            duplicates: 1,
            rejected: 2,
            interrupted: false,
        }
    );

    let report = pipeline.shutdown(Duration::from_secs(5)).await.unwrap();
    assert_eq!(report.metrics.rows_written, 3);
    assert_eq!(report.flushed, 1);

    let mut rows = writer.rows.lock().unwrap().clone();
    rows.sort();
    assert_eq!(rows, vec!["d-1", "d-2", "d-4"]);
}

#[tokio::test]
async fn test_feed_stops_when_closed() {
    let writer = Arc::new(CountingWriter::default());
    let pipeline = pipeline(writer);
    pipeline.shutdown(Duration::from_secs(1)).await.unwrap();

    let input = format!("{}\n{}", line("d-1", "20.0"), line("d-2", "20.0"));
    let fed = feed(&pipeline, input.as_bytes()).await.unwrap();
    assert_eq!(fed.lines, 1);
    assert_eq!(fed.accepted, 0);
}

#[tokio::test]
async fn test_dead_letters_appended_as_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dead_letter.jsonl");

    let (tx, rx) = mpsc::channel(4);
    let task = tokio::spawn(write_dead_letters(rx, path.clone()));

    let reading = ReadingValidator::default()
        .validate_json(&line("d-9", "19.0"))
        .unwrap();
    tx.send(FailedBatch {
        reason: FailureReason::Unavailable("connection refused".into()),
        readings: vec![reading],
    })
    .await
    .unwrap();
    tx.send(FailedBatch {
        reason: FailureReason::Overflow,
        readings: Vec::new(),
    })
    .await
    .unwrap();
    drop(tx);

    assert_eq!(task.await.unwrap().unwrap(), 2);

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["reason"]["kind"], "unavailable");
    assert_eq!(lines[0]["reason"]["message"], "connection refused");
    assert_eq!(lines[0]["readings"][0]["dataId"], "d-9");
    assert_eq!(lines[1]["reason"]["kind"], "overflow");
}

#[tokio::test]
async fn test_dead_letter_file_unwritable() {
    let (_tx, rx) = mpsc::channel(1);
    let result = write_dead_letters(rx, PathBuf::from("/nonexistent/dir/dead.jsonl")).await;
    assert!(result.unwrap_err().to_string().contains("dead-letter file"));
}

#[test]
fn test_summary_text() {
    let fed = FeedSummary {
        lines: 5,
        accepted: 3,
        duplicates: 1,
        rejected: 1,
        interrupted: false,
    };
    let metrics = MetricsSnapshot {
        rows_written: 3,
        batches_flushed: 2,
        ..Default::default()
    };

    let text = summary(&fed, &metrics);
    assert!(text.starts_with("5 line(s): 3 accepted, 1 duplicate(s), 1 rejected"));
    assert!(text.contains("3 row(s) written in 2 batch(es)"));
}
