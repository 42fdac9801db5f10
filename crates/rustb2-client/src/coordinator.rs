//! Concurrent upload of all parts of a large file.
//!
//! A producer task hashes the file part by part and feeds a bounded work
//! queue; `workers` tasks pull chunks from it and upload them through a
//! [`PartUpload`]. Confirmed parts are collected in a map keyed by part
//! number and flattened into part order once every part has reported.
//!
//! At most `workers` uploads are in flight at any instant. The first error
//! ends the upload: every task is aborted, so in-flight requests are dropped
//! instead of running to completion, and results that were already queued
//! are discarded.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rustb2_core::{B2Error, B2Result};
use rustb2_model::FilePart;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::checksums;
use crate::chunk::{Chunk, PartUpload};
use crate::planner::UploadPlan;

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

type WorkQueue = Arc<Mutex<mpsc::Receiver<Chunk>>>;

/// Drives the part uploads of one large file.
#[derive(Debug, Clone, Copy)]
pub struct UploadCoordinator {
    workers: usize,
    retry_budget: u32,
}

impl UploadCoordinator {
    /// Create a coordinator with `workers` concurrent uploads, each part
    /// being re-sent at most `retry_budget` times after a retryable error.
    #[must_use]
    pub fn new(workers: usize, retry_budget: u32) -> Self {
        Self {
            workers: workers.max(1),
            retry_budget,
        }
    }

    /// Number of concurrent uploads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Upload every part of `path` described by `plan`.
    ///
    /// Returns the part SHA1s in ascending part-number order, ready for
    /// `b2_finish_large_file`.
    pub async fn upload(
        &self,
        path: &Path,
        plan: &UploadPlan,
        uploader: Arc<dyn PartUpload>,
    ) -> B2Result<Vec<String>> {
        let part_count = plan.part_count() as usize;
        let workers = self.workers.min(part_count.max(1));

        let (work_tx, work_rx) = mpsc::channel::<Chunk>(workers);
        let work_rx: WorkQueue = Arc::new(Mutex::new(work_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<B2Result<FilePart>>(workers);

        let mut tasks = JoinSet::new();
        tasks.spawn(produce(
            path.to_path_buf(),
            *plan,
            work_tx,
            result_tx.clone(),
        ));
        for worker in 0..workers {
            tasks.spawn(work(
                worker,
                Arc::clone(&work_rx),
                Arc::clone(&uploader),
                result_tx.clone(),
                self.retry_budget,
            ));
        }
        drop(result_tx);

        debug!(path = %path.display(), part_count, workers, "Uploading parts");

        let mut sha1_by_part = BTreeMap::new();
        while sha1_by_part.len() < part_count {
            match result_rx.recv().await {
                Some(Ok(part)) => {
                    debug!(
                        part_number = part.part_number,
                        done = sha1_by_part.len() + 1,
                        part_count,
                        "Part confirmed"
                    );
                    sha1_by_part.insert(part.part_number, part.content_sha1);
                }
                Some(Err(e)) => {
                    tasks.abort_all();
                    return Err(e);
                }
                None => {
                    tasks.abort_all();
                    return Err(B2Error::Internal(anyhow::anyhow!(
                        "upload tasks exited after {} of {part_count} parts",
                        sha1_by_part.len()
                    )));
                }
            }
        }

        tasks.shutdown().await;
        Ok(sha1_by_part.into_values().collect())
    }
}

/// Hash each part and enqueue it. Dropping `work_tx` on return closes the queue.
async fn produce(
    path: PathBuf,
    plan: UploadPlan,
    work_tx: mpsc::Sender<Chunk>,
    result_tx: mpsc::Sender<B2Result<FilePart>>,
) {
    for range in plan.ranges() {
        let sha1 = match checksums::sha1_file_range(&path, range.offset, range.len).await {
            Ok(sha1) => sha1,
            Err(e) => {
                let _ = result_tx.send(Err(e)).await;
                return;
            }
        };
        debug!(part_number = range.part_number, %sha1, "Enqueued part");
        let chunk = Chunk {
            part_number: range.part_number,
            offset: range.offset,
            len: range.len,
            sha1,
        };
        if work_tx.send(chunk).await.is_err() {
            return;
        }
    }
}

async fn work(
    worker: usize,
    queue: WorkQueue,
    uploader: Arc<dyn PartUpload>,
    result_tx: mpsc::Sender<B2Result<FilePart>>,
    retry_budget: u32,
) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(chunk) = next else {
            debug!(worker, "Work queue closed");
            return;
        };
        let result = upload_with_retry(uploader.as_ref(), &chunk, retry_budget).await;
        if result_tx.send(result).await.is_err() {
            return;
        }
    }
}

async fn upload_with_retry(
    uploader: &dyn PartUpload,
    chunk: &Chunk,
    retry_budget: u32,
) -> B2Result<FilePart> {
    let mut attempt = 0;
    loop {
        match uploader.upload_part(chunk).await {
            Err(e) if e.is_retryable() && attempt < retry_budget => {
                attempt += 1;
                warn!(
                    part_number = chunk.part_number,
                    attempt,
                    retry_budget,
                    error = %e,
                    "Retrying part upload"
                );
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            result => return result,
        }
    }
}
