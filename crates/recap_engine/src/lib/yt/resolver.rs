use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tokio::process::Command;

use crate::yt::{MetadataResolver, VideoMetadata, USER_AGENT};

static WATCH_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)").unwrap()
});

static QUERY_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtube\.com/watch\?.*v=([^&\n?#]+)").unwrap());

/// Pulls the video id out of the URL shapes YouTube hands out: `watch?v=`,
/// `youtu.be/`, `embed/`, and `watch?...&v=` with the id in a later
/// query position.
pub fn extract_video_id(url: &str) -> Option<&str> {
    WATCH_URL_RE
        .captures(url)
        .or_else(|| QUERY_PARAM_RE.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Resolves video metadata by shelling out to `yt-dlp` for the title after a
/// local id extraction.
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    binary: String,
}

impl Default for YtDlpResolver {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlpResolver {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn probe_title(&self, video_url: &str) -> anyhow::Result<String> {
        let output = Command::new(&self.binary)
            .args([
                "--dump-json",
                "--no-download",
                "--quiet",
                "--no-warnings",
                "--extractor-retries",
                "3",
                "--user-agent",
                USER_AGENT,
            ])
            .arg(video_url)
            .output()
            .await?;

        if !output.status.success() {
            anyhow::bail!(
                "yt-dlp exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            );
        }

        #[derive(Deserialize)]
        struct Probe {
            title: String,
        }

        let probe: Probe = serde_json::from_slice(&output.stdout)?;
        Ok(probe.title)
    }
}

impl MetadataResolver for YtDlpResolver {
    type Error = anyhow::Error;

    async fn resolve(&self, video_url: &str) -> anyhow::Result<VideoMetadata> {
        let Some(video_id) = extract_video_id(video_url) else {
            anyhow::bail!("No YouTube video id in URL: {video_url}");
        };

        // A failed title probe is not fatal; the id is what the pipeline needs.
        let title = match self.probe_title(video_url).await {
            Ok(title) => title,
            Err(e) => {
                tracing::warn!(error = ?e, %video_id, "Could not fetch video title");
                format!("Video {video_id}")
            }
        };

        Ok(VideoMetadata {
            video_id: video_id.to_string(),
            title,
        })
    }
}
