use reqwest::Client;
use serde::Deserialize;

use crate::{
    llm::{summary_user_prompt, SYSTEM_PROMPT},
    SummarizeRequest, Summarizer, SummaryResponse,
};

/// Summarization against a local Ollama server, for setups without an OpenAI
/// key. The generate endpoint takes one flat prompt, so the system text is
/// folded into it.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Empty response from model")]
    EmptyResponse,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl Summarizer for OllamaClient {
    type Error = OllamaError;

    #[tracing::instrument(skip(self, request), fields(model = %self.model))]
    async fn summarize(&self, request: SummarizeRequest) -> Result<SummaryResponse, Self::Error> {
        let prompt = format!("{SYSTEM_PROMPT}\n\n{}", summary_user_prompt(&request));
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": 0.7,
                "top_p": 0.8,
                "top_k": 40,
                "num_predict": 2048
            }
        });

        let resp = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to reach Ollama server"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(OllamaError::Api { status, message });
        }

        let response = resp.json::<GenerateResponse>().await?;
        let summary = response.response.trim().to_string();
        if summary.is_empty() {
            return Err(OllamaError::EmptyResponse);
        }

        Ok(SummaryResponse { summary })
    }
}
