/// Classified failure of one pipeline run.
///
/// The `Display` string is the user-visible message that lands on the job
/// record; the adapter-level cause rides along for logging only.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Could not extract video ID from URL")]
    Resolution { detail: String },

    #[error("Could not transcribe video audio")]
    Transcription { detail: String },

    #[error("Could not generate summary")]
    Summarization { detail: String },

    /// Anything the stages did not classify, message is the stringified cause.
    #[error("{0}")]
    Internal(String),
}

impl PipelineError {
    pub fn detail(&self) -> &str {
        match self {
            PipelineError::Resolution { detail }
            | PipelineError::Transcription { detail }
            | PipelineError::Summarization { detail } => detail,
            PipelineError::Internal(msg) => msg,
        }
    }
}
