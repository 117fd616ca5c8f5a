use std::path::PathBuf;

use reqwest::Client;
use serde::Deserialize;

use crate::{
    llm::{summary_user_prompt, SYSTEM_PROMPT},
    yt::AudioFetcher,
    SummarizeRequest, Summarizer, SummaryResponse, TranscribeRequest, TranscribeResponse,
    Transcriber,
};

/// OpenAI-backed transcription and summarization.
///
/// Transcription downloads the audio through the fetcher, uploads it to the
/// Whisper endpoint, and removes the download again before returning.
#[derive(Clone)]
pub struct OpenAiClient<F> {
    client: Client,
    api_key: String,
    base_url: String,
    fetcher: F,
    workdir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Audio error: {0}")]
    Audio(String),
}

impl<F> OpenAiClient<F> {
    pub const TRANSCRIPTION_MODEL: &'static str = "whisper-1";
    pub const SUMMARIZER_MODEL: &'static str = "gpt-4o-mini";

    pub fn new(api_key: impl Into<String>, fetcher: F, workdir: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".into(),
            fetcher,
            workdir: workdir.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub async fn send_transcribe_request(
        &self,
        file: impl Into<PathBuf>,
        model_name: impl Into<String>,
    ) -> Result<TranscribeResponse, OpenAiError> {
        let audio_path = file.into();

        let bytes = tokio::fs::read(&audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio")
            .to_string();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;

        let form = reqwest::multipart::Form::new()
            .text("model", model_name.into())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment")
            .part("file", part);

        let resp = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(OpenAiError::Api { status, message });
        }

        Ok(resp.json::<TranscribeResponse>().await?)
    }

    pub async fn send_completion_request(
        &self,
        model_name: impl Into<String>,
        user_content: impl Into<String>,
    ) -> Result<CompletionResponse, OpenAiError> {
        let body = serde_json::json!({
            "model": model_name.into(),
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_PROMPT
                },
                {
                    "role": "user",
                    "content": user_content.into()
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(OpenAiError::Api { status, message });
        }

        Ok(resp.json::<CompletionResponse>().await?)
    }

    fn audio_dir(&self) -> PathBuf {
        self.workdir.join("audio")
    }
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: CompletionMessage,
    pub finish_reason: String,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: Option<String>,
}

impl<F: AudioFetcher + Send + Sync> Transcriber for OpenAiClient<F> {
    type Error = OpenAiError;

    #[tracing::instrument(skip(self), fields(video_id = %request.video_id))]
    async fn transcribe(&self, request: TranscribeRequest) -> Result<TranscribeResponse, Self::Error> {
        let audio_dir = self.audio_dir();
        let audio_path = self
            .fetcher
            .fetch(&request.video_url, &request.video_id, &audio_dir)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to download audio"))
            .map_err(|e| OpenAiError::Audio(format!("{e:?}")))?;

        let response = self
            .send_transcribe_request(&audio_path, Self::TRANSCRIPTION_MODEL)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to transcribe audio"));

        if let Err(e) = self.fetcher.clean_up(&request.video_id, &audio_dir) {
            tracing::warn!(error = ?e, video_id = %request.video_id, "Failed to clean up downloaded audio");
        }

        response
    }
}

impl<F: Send + Sync> Summarizer for OpenAiClient<F> {
    type Error = OpenAiError;

    #[tracing::instrument(skip(self, request))]
    async fn summarize(&self, request: SummarizeRequest) -> Result<SummaryResponse, Self::Error> {
        let response = self
            .send_completion_request(Self::SUMMARIZER_MODEL, summary_user_prompt(&request))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to summarize content"))?;

        let summary = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| OpenAiError::Api {
                status: 0,
                message: "No content in response".into(),
            })?;

        Ok(SummaryResponse { summary })
    }
}
