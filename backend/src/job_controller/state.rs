//! Tracks the state of batch jobs running in the background.
//!
//! Batch endpoints (`services::batches`) return a job id straight away and keep working after
//! the response is sent. Progress travels back here as messages so that the workers never touch
//! the shared table directly.
//!
//! The main components are:
//! - `JobsState`: the clonable, shared table of job statuses plus the sender used to update it.
//!   It is injected into the Actix application state in `main.rs`.
//! - `JobUpdate`: a status change for one job, sent by a worker.
//! - `start_job_updater`: the single task that applies `JobUpdate`s to the table.

use common::jobs::JobStatus;
use log::debug;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::{mpsc, RwLock};
use tokio::time::{self, Instant, MissedTickBehavior};
use uuid::Uuid;

/// A thread-safe, shareable container for the state of all batch jobs.
#[derive(Clone)]
pub struct JobsState {
    /// Job id to its latest status.
    ///
    /// Read by `GET /api/batches/status/{job_id}`, written only by `start_job_updater` after
    /// registration.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Workers push their `JobUpdate`s through this sender.
    pub tx: mpsc::Sender<JobUpdate>,
}

/// A status update for a specific job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobsState {
    /// Creates an empty table together with the receiver `start_job_updater` consumes.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(buffer);
        (
            JobsState {
                jobs: Arc::new(RwLock::new(HashMap::new())),
                tx,
            },
            rx,
        )
    }

    /// Allocates a job id and records it as `Pending`.
    pub async fn register(&self) -> String {
        let job_id = Uuid::new_v4().to_string();
        self.jobs
            .write()
            .await
            .insert(job_id.clone(), JobStatus::Pending);
        job_id
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Non-blocking send for use inside progress callbacks. When the channel is full the
    /// update is dropped; the next one supersedes it anyway.
    pub fn report(&self, job_id: &str, status: JobStatus) {
        let _ = self.tx.try_send(JobUpdate {
            job_id: job_id.to_string(),
            status,
        });
    }

    /// Awaited send, used for the final status so it is never dropped.
    pub async fn finish(&self, job_id: &str, status: JobStatus) {
        let _ = self
            .tx
            .send(JobUpdate {
                job_id: job_id.to_string(),
                status,
            })
            .await;
    }
}

/// Applies incoming `JobUpdate`s to the shared table until every sender is gone, and drops
/// jobs that have been finished for longer than `retention`.
///
/// Spawned once from `main.rs`.
pub async fn start_job_updater(
    jobs: Arc<RwLock<HashMap<String, JobStatus>>>,
    mut rx: mpsc::Receiver<JobUpdate>,
    retention: Duration,
) {
    let mut finished_at: HashMap<String, Instant> = HashMap::new();
    let mut sweep = time::interval((retention / 4).max(Duration::from_millis(10)));
    sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            update = rx.recv() => {
                let Some(update) = update else { break };
                let mut table = jobs.write().await;
                // A late progress message must not overwrite a final status.
                if finished_at.contains_key(&update.job_id) || is_final(table.get(&update.job_id)) {
                    continue;
                }
                if is_final(Some(&update.status)) {
                    finished_at.insert(update.job_id.clone(), Instant::now());
                }
                table.insert(update.job_id, update.status);
            }
            _ = sweep.tick() => {
                let expired: Vec<String> = finished_at
                    .iter()
                    .filter(|(_, at)| at.elapsed() >= retention)
                    .map(|(id, _)| id.clone())
                    .collect();
                if expired.is_empty() {
                    continue;
                }
                let mut table = jobs.write().await;
                for job_id in expired {
                    finished_at.remove(&job_id);
                    table.remove(&job_id);
                }
                debug!("Job table pruned, {} jobs left", table.len());
            }
        }
    }
}

fn is_final(status: Option<&JobStatus>) -> bool {
    matches!(status, Some(JobStatus::Completed(_)) | Some(JobStatus::Failed(_)))
}
