mod dispatcher;
mod error;
mod llm;
mod pipeline;
pub mod routes;
pub mod server;
pub mod tracing;
pub mod types;
pub mod yt;

pub use dispatcher::{DispatcherConfig, JobDispatcher, OverflowPolicy, SubmitError};
pub use error::PipelineError;
pub use llm::{
    ollama::{self, OllamaClient, OllamaError},
    openai::{self, OpenAiClient, OpenAiError},
    summarizer::{SummarizeRequest, Summarizer, SummaryResponse},
    transcriber::{TranscribeRequest, TranscribeResponse, TranscribeSegment, Transcriber},
};
pub use pipeline::{builder::SummaryPipelineBuilder, stage, SummaryPipeline};
pub use types::{PipelineInput, PipelineOutput};
