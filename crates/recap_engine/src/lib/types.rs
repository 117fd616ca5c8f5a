/// Immutable input for one summarization job.
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub video_url: String,
    /// Caller-supplied title; an absent or empty hint defers to whatever the
    /// resolver extracts.
    pub title_hint: Option<String>,
}

/// What a successful pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub video_id: String,
    pub video_title: String,
    pub summary: String,
}
