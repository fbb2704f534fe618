//! Batch worker loop.
//!
//! Each worker pulls jobs from the shared queue, reads the image from disk,
//! runs the verifier, and hands the outcome to the report writer.

use std::fs;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Mutex;

use crate::batch::queue::BatchJob;
use crate::verify::{Assessment, Verifier};

/// Result of one job. `Err` covers failures that prevent scoring at all
/// (unreadable file, invalid input).
#[derive(Debug)]
pub struct BatchOutcome {
    pub job: BatchJob,
    pub result: Result<Assessment, String>,
}

fn process_job(verifier: &Verifier, job: BatchJob) -> BatchOutcome {
    let result = match fs::read(&job.image_path) {
        Ok(bytes) => verifier
            .verify_and_score(
                &bytes,
                &job.entry.skill,
                job.entry.projects,
                job.entry.repo.as_deref(),
            )
            .map_err(|e| e.to_string()),
        Err(e) => Err(format!(
            "Failed to read image {}: {}",
            job.image_path.display(),
            e
        )),
    };

    BatchOutcome { job, result }
}

/// Runs the worker loop until the queue is drained and its sender dropped.
pub fn run_batch_worker(
    worker_id: usize,
    receiver: &Mutex<Receiver<BatchJob>>,
    verifier: &Verifier,
    results: Sender<BatchOutcome>,
) {
    crate::log(&format!("Batch worker {} started", worker_id));

    loop {
        // Hold the lock only while receiving, not while verifying
        let next = {
            let guard = match receiver.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.recv()
        };

        let job = match next {
            Ok(job) => job,
            Err(_) => break,
        };

        crate::log(&format!(
            "Batch worker {}: entry {} ({})",
            worker_id,
            job.index,
            job.image_path.display()
        ));

        if results.send(process_job(verifier, job)).is_err() {
            crate::log(&format!(
                "Batch worker {}: result channel closed, exiting",
                worker_id
            ));
            break;
        }
    }

    crate::log(&format!("Batch worker {} finished", worker_id));
}
