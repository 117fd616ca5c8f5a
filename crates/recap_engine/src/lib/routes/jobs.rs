//! Submission, status, and result endpoints.
//!
//! Response bodies always carry an explicit `success` flag. The result
//! endpoint consumes the record on a terminal read, so each outcome can be
//! fetched once; afterwards the id resolves to 404.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use recap_jobs::{JobId, ResultPoll};
use serde::Deserialize;
use serde_json::json;

use crate::{
    server::AppState, types::PipelineInput, yt::MetadataResolver, PipelineError, SubmitError,
    Summarizer, Transcriber,
};

pub fn job_routes<R, T, S>() -> Router<AppState<R, T, S>>
where
    R: MetadataResolver + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    Router::new()
        .route("/summarize", post(submit::<R, T, S>))
        .route("/summarize-sync", post(submit_sync::<R, T, S>))
        .route("/status/{request_id}", get(status::<R, T, S>))
        .route("/result/{request_id}", get(result::<R, T, S>))
}

#[derive(Debug, Deserialize)]
struct SummarizeBody {
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    video_title: Option<String>,
}

impl SummarizeBody {
    /// The original URL, or `None` when the field is absent or blank.
    fn validated(self) -> Option<PipelineInput> {
        let video_url = self.video_url.filter(|url| !url.trim().is_empty())?;
        Some(PipelineInput {
            video_url,
            title_hint: self.video_title,
        })
    }
}

async fn submit<R, T, S>(
    State(state): State<AppState<R, T, S>>,
    Json(body): Json<SummarizeBody>,
) -> Response
where
    R: MetadataResolver + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    let Some(input) = body.validated() else {
        return error_response(StatusCode::BAD_REQUEST, "Missing video_url in request");
    };

    match state.dispatcher.submit(input).await {
        Ok(id) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "request_id": id.as_str(),
                "message": "Processing started"
            })),
        )
            .into_response(),
        Err(SubmitError::QueueFull) => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Server is at capacity, try again later",
        ),
        Err(SubmitError::Closed) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Job queue is shut down")
        }
    }
}

async fn status<R, T, S>(
    State(state): State<AppState<R, T, S>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: MetadataResolver + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    let id = JobId::from(request_id.as_str());
    match state.store.status(&id) {
        Some(stage) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "request_id": request_id,
                "status": stage
            })),
        )
            .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Request not found"),
    }
}

async fn result<R, T, S>(
    State(state): State<AppState<R, T, S>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: MetadataResolver + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    let id = JobId::from(request_id.as_str());
    match state.store.consume(&id) {
        ResultPoll::Finished(Ok(summary)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "summary": summary
            })),
        )
            .into_response(),
        ResultPoll::Finished(Err(error)) => (
            StatusCode::OK,
            Json(json!({
                "success": false,
                "error": error
            })),
        )
            .into_response(),
        ResultPoll::Processing { stage } => (
            StatusCode::OK,
            Json(json!({
                "success": false,
                "status": stage,
                "message": "Still processing"
            })),
        )
            .into_response(),
        ResultPoll::NotFound => error_response(StatusCode::NOT_FOUND, "Request not found"),
    }
}

async fn submit_sync<R, T, S>(
    State(state): State<AppState<R, T, S>>,
    Json(body): Json<SummarizeBody>,
) -> Response
where
    R: MetadataResolver + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    let Some(input) = body.validated() else {
        return error_response(StatusCode::BAD_REQUEST, "Missing video_url in request");
    };

    match state.pipeline.run(input).await {
        Ok(output) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "summary": output.summary,
                "video_id": output.video_id,
                "video_title": output.video_title
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, detail = %e.detail(), "Synchronous pipeline failed");
            let status = match e {
                PipelineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            };
            error_response(status, &e.to_string())
        }
    }
}

fn error_response(status: StatusCode, error: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": error
        })),
    )
        .into_response()
}
