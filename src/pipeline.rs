//! Sequential row-to-embedding pipeline.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::embedder::{EmbeddingRequest, EmbeddingService};
use crate::loader::Row;

/// Output unit pairing a row's original position and data with its vector.
/// Field order here is the key order of the serialized JSON objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Zero-based position of the row in the original input.
    pub index: usize,
    /// The full input row, verbatim.
    pub metadata: Row,
    /// Embedding vector returned by the service.
    pub embedding: Vec<f32>,
}

/// Client-side pacing between successive embedding calls.
pub trait Pacer {
    /// Blocks (or not) before the next call is dispatched.
    fn pause(&self);
}

/// Pacer that sleeps for a fixed duration between calls.
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    /// Builds a pacer sleeping `delay` between calls.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Pacer for FixedDelay {
    fn pause(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

/// Runs every row through the embedding service, in input order, one call
/// per row. Failures are per-row: the row is logged and skipped, never
/// retried, and the run always completes. The returned records keep input
/// order and original indices, so the result holds at most one record per
/// input row.
pub fn run_pipeline(
    rows: &[Row],
    service: &dyn EmbeddingService,
    model_id: &str,
    pacer: &dyn Pacer,
) -> Vec<EmbeddingRecord> {
    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let body = row.joined_text();
        let request = EmbeddingRequest {
            model_id,
            body: &body,
        };
        match service.embed(&request) {
            Ok(embedding) => {
                eprintln!("embedded row {} ({} of {})...", index, index + 1, rows.len());
                records.push(EmbeddingRecord {
                    index,
                    metadata: row.clone(),
                    embedding,
                });
            }
            Err(err) => {
                eprintln!("row {index}: no embedding generated: {err}; skipping.");
            }
        }
        if index + 1 < rows.len() {
            pacer.pause();
        }
    }
    records
}
