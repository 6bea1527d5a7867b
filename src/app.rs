use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;

use crate::domain::{BioSampleId, FetchOutcome, MetadataRecord};
use crate::ncbi::{BioSampleClient, fetch_metadata};

#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub records: Vec<MetadataRecord>,
    pub succeeded: usize,
    pub failed: usize,
    pub started_at: String,
    pub finished_at: String,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.records.len()
    }
}

/// `position` is 1-based and `id` is set for per-identifier events; the
/// opening summary event carries only `total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub message: String,
    pub position: Option<usize>,
    pub total: usize,
    pub id: Option<BioSampleId>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Clone)]
pub struct App<C: BioSampleClient> {
    client: C,
    pause: Duration,
}

impl<C: BioSampleClient> App<C> {
    pub fn new(client: C, pause: Duration) -> Self {
        Self { client, pause }
    }

    /// Fetches every identifier in order, one request at a time, sleeping
    /// `pause` after each lookup including the last one.
    pub fn run(&self, ids: &[BioSampleId], sink: &dyn ProgressSink) -> BatchResult {
        let started_at = Utc::now().to_rfc3339();
        let total = ids.len();
        sink.event(ProgressEvent {
            message: format!("Processing {total} BioSample IDs..."),
            position: None,
            total,
            id: None,
        });

        let mut records = Vec::with_capacity(total);
        let mut failed = 0usize;
        for (index, id) in ids.iter().enumerate() {
            sink.event(ProgressEvent {
                message: format!("[{}/{}] Fetching {}...", index + 1, total, id),
                position: Some(index + 1),
                total,
                id: Some(id.clone()),
            });

            let start = Instant::now();
            let outcome = fetch_metadata(&self.client, id);
            if let FetchOutcome::Failed { error, .. } = &outcome {
                failed += 1;
                tracing::warn!(id = %id, %error, "lookup failed");
            }
            tracing::debug!(
                id = %id,
                latency_ms = start.elapsed().as_millis() as u64,
                "lookup finished"
            );
            records.push(outcome.into_record());

            thread::sleep(self.pause);
        }

        BatchResult {
            succeeded: total - failed,
            failed,
            records,
            started_at,
            finished_at: Utc::now().to_rfc3339(),
        }
    }
}
