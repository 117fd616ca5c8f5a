use crate::{yt::MetadataResolver, Summarizer, SummaryPipeline, Transcriber};

pub struct SummaryPipelineBuilder<R = (), T = (), S = ()> {
    resolver: R,
    transcriber: T,
    summarizer: S,
}

impl SummaryPipelineBuilder {
    pub fn new() -> Self {
        Self {
            resolver: (),
            transcriber: (),
            summarizer: (),
        }
    }
}

impl Default for SummaryPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, T, S> SummaryPipelineBuilder<R, T, S> {
    pub fn resolver<R2: MetadataResolver + Send + Sync + 'static>(
        self,
        resolver: R2,
    ) -> SummaryPipelineBuilder<R2, T, S> {
        SummaryPipelineBuilder {
            resolver,
            transcriber: self.transcriber,
            summarizer: self.summarizer,
        }
    }

    pub fn transcriber<T2: Transcriber + Send + Sync + 'static>(
        self,
        transcriber: T2,
    ) -> SummaryPipelineBuilder<R, T2, S> {
        SummaryPipelineBuilder {
            resolver: self.resolver,
            transcriber,
            summarizer: self.summarizer,
        }
    }

    pub fn summarizer<S2: Summarizer + Send + Sync + 'static>(
        self,
        summarizer: S2,
    ) -> SummaryPipelineBuilder<R, T, S2> {
        SummaryPipelineBuilder {
            resolver: self.resolver,
            transcriber: self.transcriber,
            summarizer,
        }
    }
}

impl<R, T, S> SummaryPipelineBuilder<R, T, S>
where
    R: MetadataResolver + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    pub fn build(self) -> SummaryPipeline<R, T, S> {
        SummaryPipeline {
            resolver: self.resolver,
            transcriber: self.transcriber,
            summarizer: self.summarizer,
        }
    }
}
