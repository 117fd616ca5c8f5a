use std::{fmt::Debug, future::Future};

use serde::Deserialize;

pub trait Summarizer {
    type Error: Debug;

    fn summarize(
        &self,
        request: SummarizeRequest,
    ) -> impl Future<Output = Result<SummaryResponse, Self::Error>> + Send;
}

#[derive(Debug, Clone)]
pub struct SummarizeRequest {
    pub transcript: String,
    pub video_title: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}
