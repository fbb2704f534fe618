//! Batch verification of many certificate submissions.
//!
//! This module provides:
//! - JSON manifest loading and the shared work queue
//! - Worker threads sharing one `Verifier`
//! - Append-only CSV reporting

pub mod queue;
pub mod report;
pub mod worker;

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::mpsc::channel;
use std::thread;

use crate::verify::Verifier;
use queue::{create_work_queue, load_manifest};
use report::{append_outcome, init_csv};
use worker::{run_batch_worker, BatchOutcome};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub verified: usize,
    /// Entries with any error: unreadable image, invalid input, or a failed OCR stage
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: &BatchOutcome) {
        self.processed += 1;
        match &outcome.result {
            Ok(assessment) => {
                if assessment.verification.verified {
                    self.verified += 1;
                }
                if assessment.verification.error().is_some() {
                    self.failed += 1;
                }
            }
            Err(_) => self.failed += 1,
        }
    }
}

/// Verifies every manifest entry across `workers` threads and appends a CSV
/// row per entry to `out`.
pub fn run_batch(
    manifest: &Path,
    out: &Path,
    workers: usize,
    verifier: &Verifier,
) -> Result<BatchSummary> {
    let jobs = load_manifest(manifest)?;
    init_csv(out)?;

    crate::log(&format!(
        "Batch: {} entries from {} with {} workers",
        jobs.len(),
        manifest.display(),
        workers.max(1)
    ));

    let (job_tx, job_rx) = create_work_queue();
    for job in jobs {
        job_tx
            .send(job)
            .map_err(|_| anyhow!("Batch work queue closed unexpectedly"))?;
    }
    drop(job_tx);

    let (result_tx, result_rx) = channel::<BatchOutcome>();
    let mut summary = BatchSummary::default();

    thread::scope(|scope| {
        for worker_id in 0..workers.max(1) {
            let results = result_tx.clone();
            let job_rx = &job_rx;
            scope.spawn(move || run_batch_worker(worker_id, job_rx, verifier, results));
        }
        drop(result_tx);

        for outcome in result_rx {
            summary.record(&outcome);
            if let Err(e) = append_outcome(out, &outcome) {
                crate::log(&format!(
                    "Batch: failed to write row for entry {}: {}",
                    outcome.job.index, e
                ));
            }
        }
    });

    crate::log(&format!(
        "Batch finished: {} processed, {} verified, {} failed",
        summary.processed, summary.verified, summary.failed
    ));

    Ok(summary)
}
