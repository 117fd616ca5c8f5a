use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use recap_jobs::JobStore;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    routes::{health_routes, job_routes},
    yt::MetadataResolver,
    JobDispatcher, Summarizer, SummaryPipeline, Transcriber,
};

/// Shared handles behind every route: the store for reads, the dispatcher for
/// submissions, and the pipeline for the synchronous path.
pub struct AppState<R, T, S>
where
    R: MetadataResolver + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    pub store: Arc<JobStore>,
    pub pipeline: Arc<SummaryPipeline<R, T, S>>,
    pub dispatcher: Arc<JobDispatcher>,
}

impl<R, T, S> Clone for AppState<R, T, S>
where
    R: MetadataResolver + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            pipeline: Arc::clone(&self.pipeline),
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

pub fn router<R, T, S>(state: AppState<R, T, S>) -> Router
where
    R: MetadataResolver + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    // Submissions come from browser extensions, so any origin may call.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(job_routes::<R, T, S>())
        .with_state(state)
        .merge(health_routes())
        .layer(cors)
}

pub async fn start_server<R, T, S>(
    host: &str,
    port: u16,
    state: AppState<R, T, S>,
) -> anyhow::Result<()>
where
    R: MetadataResolver + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;

    let app = router(state);

    tracing::info!("Starting server on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
