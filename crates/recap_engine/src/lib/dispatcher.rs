//! # Job Dispatcher
//!
//! Accepts submissions, allocates job records, and feeds a fixed pool of
//! pipeline workers through one bounded queue. The pool replaces the obvious
//! task-per-request approach so a burst of submissions cannot exhaust the
//! process; what happens to a submission that finds the queue full is an
//! explicit configuration choice.

use std::sync::Arc;

use recap_jobs::{JobId, JobStore};
use tokio::sync::{mpsc, Mutex};

use crate::{
    pipeline::stage, types::PipelineInput, yt::MetadataResolver, Summarizer, SummaryPipeline,
    Transcriber,
};

/// What to do with a submission when the queue is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Fail the submission immediately.
    #[default]
    Reject,
    /// Hold the submitter until a slot frees up.
    Wait,
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub on_full: OverflowPolicy,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 32,
            on_full: OverflowPolicy::Reject,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Job queue is full")]
    QueueFull,
    #[error("Job queue is shut down")]
    Closed,
}

struct Dispatch {
    id: JobId,
    input: PipelineInput,
}

pub struct JobDispatcher {
    store: Arc<JobStore>,
    queue: mpsc::Sender<Dispatch>,
    on_full: OverflowPolicy,
}

impl JobDispatcher {
    /// Spawns `config.workers` pipeline workers sharing one bounded queue.
    /// Workers run until the dispatcher is dropped and the queue drains.
    pub fn start<R, T, S>(
        store: Arc<JobStore>,
        pipeline: Arc<SummaryPipeline<R, T, S>>,
        config: DispatcherConfig,
    ) -> Self
    where
        R: MetadataResolver + Send + Sync + 'static,
        T: Transcriber + Send + Sync + 'static,
        S: Summarizer + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel::<Dispatch>(config.queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        for worker in 0..config.workers.max(1) {
            let rx = Arc::clone(&rx);
            let store = Arc::clone(&store);
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                loop {
                    let dispatch = { rx.lock().await.recv().await };
                    let Some(dispatch) = dispatch else { break };
                    tracing::debug!(worker, job_id = %dispatch.id, "Picked up job");
                    pipeline
                        .run_tracked(dispatch.id, dispatch.input, Arc::clone(&store))
                        .await;
                }
            });
        }

        Self {
            store,
            queue: tx,
            on_full: config.on_full,
        }
    }

    /// Creates the job record and enqueues the work. The record is visible to
    /// status reads as soon as this returns; a rejected submission leaves no
    /// record behind.
    pub async fn submit(&self, input: PipelineInput) -> Result<JobId, SubmitError> {
        let id = self.store.create(stage::QUEUED);
        let dispatch = Dispatch {
            id: id.clone(),
            input,
        };

        let enqueued = match self.on_full {
            OverflowPolicy::Reject => self.queue.try_send(dispatch).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => SubmitError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => SubmitError::Closed,
            }),
            OverflowPolicy::Wait => self
                .queue
                .send(dispatch)
                .await
                .map_err(|_| SubmitError::Closed),
        };

        if let Err(e) = enqueued {
            tracing::warn!(job_id = %id, error = %e, "Submission not enqueued");
            self.store.discard(&id);
            return Err(e);
        }

        tracing::info!(job_id = %id, "Job submitted");
        Ok(id)
    }
}
