//! # Summary Pipeline
//!
//! The sequential resolve → transcribe → summarize state machine. One run per
//! job; the tracked entry point reports every transition through the job
//! record and converts anything that goes wrong, panics included, into a
//! terminal `Failed` state.

pub mod builder;

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use recap_jobs::{JobId, JobStore};

use crate::{
    error::PipelineError,
    types::{PipelineInput, PipelineOutput},
    yt::MetadataResolver,
    SummarizeRequest, Summarizer, TranscribeRequest, Transcriber,
};

/// Stage descriptions surfaced through the status endpoint.
pub mod stage {
    pub const QUEUED: &str = "Starting...";
    pub const RESOLVING: &str = "Extracting video info...";
    pub const TRANSCRIBING: &str = "Downloading and transcribing audio...";
    pub const SUMMARIZING: &str = "Generating summary with AI...";
}

#[derive(Debug)]
pub struct SummaryPipeline<R, T, S>
where
    R: MetadataResolver + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    resolver: R,
    transcriber: T,
    summarizer: S,
}

impl<R, T, S> SummaryPipeline<R, T, S>
where
    R: MetadataResolver + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    /// The three stages in their fixed order. `progress` is called with the
    /// stage description before each stage is entered. No stage is retried
    /// here; adapters handle their own transient failures.
    async fn run_stages(
        &self,
        input: &PipelineInput,
        progress: &mut impl FnMut(&str),
    ) -> Result<PipelineOutput, PipelineError> {
        progress(stage::RESOLVING);
        let metadata = self
            .resolver
            .resolve(&input.video_url)
            .await
            .map_err(|e| PipelineError::Resolution {
                detail: format!("{e:?}"),
            })?;
        if metadata.video_id.is_empty() {
            return Err(PipelineError::Resolution {
                detail: "resolver returned an empty video id".into(),
            });
        }

        let video_title = input
            .title_hint
            .as_deref()
            .filter(|hint| !hint.is_empty())
            .map(str::to_string)
            .unwrap_or(metadata.title);

        progress(stage::TRANSCRIBING);
        let transcript = self
            .transcriber
            .transcribe(TranscribeRequest {
                video_url: input.video_url.clone(),
                video_id: metadata.video_id.clone(),
            })
            .await
            .map_err(|e| PipelineError::Transcription {
                detail: format!("{e:?}"),
            })?;
        if transcript.text.trim().is_empty() {
            return Err(PipelineError::Transcription {
                detail: "transcriber returned an empty transcript".into(),
            });
        }

        progress(stage::SUMMARIZING);
        let summary = self
            .summarizer
            .summarize(SummarizeRequest {
                transcript: transcript.text,
                video_title: video_title.clone(),
            })
            .await
            .map_err(|e| PipelineError::Summarization {
                detail: format!("{e:?}"),
            })?;
        if summary.summary.trim().is_empty() {
            return Err(PipelineError::Summarization {
                detail: "summarizer returned an empty summary".into(),
            });
        }

        Ok(PipelineOutput {
            video_id: metadata.video_id,
            video_title,
            summary: summary.summary,
        })
    }

    /// Blocking call path: same stages, result handed straight back, no job
    /// record involved.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, input: PipelineInput) -> Result<PipelineOutput, PipelineError> {
        self.run_stages(&input, &mut |stage| tracing::info!(stage, "Pipeline stage"))
            .await
    }

    /// Tracked call path: every transition lands on the job record. Nothing
    /// escapes to the caller; this is the recovery boundary for the worker.
    #[tracing::instrument(skip(self, input, store), fields(job_id = %id))]
    pub async fn run_tracked(&self, id: JobId, input: PipelineInput, store: Arc<JobStore>) {
        let outcome = {
            let store = Arc::clone(&store);
            let record_id = id.clone();
            let mut progress = move |stage: &str| store.advance(&record_id, stage);
            AssertUnwindSafe(self.run_stages(&input, &mut progress))
                .catch_unwind()
                .await
        };

        match outcome {
            Ok(Ok(output)) => {
                tracing::info!(video_id = %output.video_id, "Pipeline complete");
                store.complete(&id, output.summary);
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, detail = %e.detail(), "Pipeline failed");
                store.fail(&id, e.to_string());
            }
            Err(panic) => {
                let cause = panic_message(panic);
                tracing::error!(%cause, "Pipeline panicked");
                store.fail(&id, cause);
            }
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "pipeline worker panicked".to_string()
    }
}
