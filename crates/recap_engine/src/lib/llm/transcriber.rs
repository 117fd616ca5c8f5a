use std::{fmt::Debug, future::Future};

use serde::Deserialize;

pub trait Transcriber {
    type Error: Debug;

    fn transcribe(
        &self,
        request: TranscribeRequest,
    ) -> impl Future<Output = Result<TranscribeResponse, Self::Error>> + Send;
}

/// Everything a transcriber needs to locate the audio: the original URL for
/// the downloader and the resolved id for file naming.
#[derive(Debug, Clone)]
pub struct TranscribeRequest {
    pub video_url: String,
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TranscribeResponse {
    pub duration: f64,
    pub text: String,
    pub segments: Option<Vec<TranscribeSegment>>,
}

#[derive(Debug, Deserialize)]
pub struct TranscribeSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}
