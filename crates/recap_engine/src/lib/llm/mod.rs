pub mod ollama;
pub mod openai;
pub mod summarizer;
pub mod transcriber;

use summarizer::SummarizeRequest;

pub(crate) const SYSTEM_PROMPT: &str = include_str!("./prompts/system_0.txt");

/// User-message body handed to a summarization backend.
pub(crate) fn summary_user_prompt(request: &SummarizeRequest) -> String {
    format!(
        "Video Title: {}\n\nTranscript:\n{}",
        request.video_title, request.transcript
    )
}
