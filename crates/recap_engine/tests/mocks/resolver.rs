use std::sync::{Arc, Mutex};

use recap_engine::yt::{MetadataResolver, VideoMetadata};
use tokio::sync::Semaphore;

#[derive(Clone)]
pub struct MockResolver {
    pub video_id: String,
    pub title: String,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
    /// When set, `resolve` parks on the semaphore until the test releases
    /// permits, keeping workers busy on demand.
    pub gate: Option<Arc<Semaphore>>,
}

impl MockResolver {
    pub fn new(video_id: &str, title: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            title: title.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
            gate: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new("", "")
        }
    }

    pub fn gated(video_id: &str, title: &str, gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(video_id, title)
        }
    }
}

impl MetadataResolver for MockResolver {
    type Error = anyhow::Error;

    async fn resolve(&self, video_url: &str) -> anyhow::Result<VideoMetadata> {
        self.calls.lock().unwrap().push(video_url.to_string());
        if let Some(ref gate) = self.gate {
            let _permit = gate.acquire().await?;
        }
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(VideoMetadata {
            video_id: self.video_id.clone(),
            title: self.title.clone(),
        })
    }
}
