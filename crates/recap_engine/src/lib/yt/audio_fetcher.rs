use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::yt::{AudioFetcher, USER_AGENT};

/// Format chain handed to yt-dlp, most specific first. Whatever container
/// comes back is fine; the transcription API accepts all of them.
const AUDIO_FORMAT: &str = "bestaudio[ext=webm]/bestaudio[ext=m4a]/bestaudio";

/// Audio downloader shelling out to `yt-dlp`.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    binary: String,
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlpFetcher {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl AudioFetcher for YtDlpFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch(
        &self,
        video_url: &str,
        video_id: &str,
        dest_dir: &Path,
    ) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(dest_dir).await?;

        // yt-dlp picks the extension, so download to a template and find the
        // produced file afterwards.
        let output_template = dest_dir.join(format!("{video_id}.%(ext)s"));
        let output = Command::new(&self.binary)
            .args([
                "--format",
                AUDIO_FORMAT,
                "--retries",
                "3",
                "--extractor-retries",
                "3",
                "--no-warnings",
                "--user-agent",
                USER_AGENT,
                "--output",
            ])
            .arg(&output_template)
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

        find_downloaded(video_id, dest_dir)
    }

    fn clean_up(&self, video_id: &str, dest_dir: &Path) -> anyhow::Result<()> {
        let prefix = format!("{video_id}.");
        for entry in std::fs::read_dir(dest_dir)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with(&prefix) {
                std::fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}

fn find_downloaded(video_id: &str, dest_dir: &Path) -> anyhow::Result<PathBuf> {
    let prefix = format!("{video_id}.");
    for entry in std::fs::read_dir(dest_dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with(&prefix) {
            return Ok(entry.path());
        }
    }
    anyhow::bail!(
        "yt-dlp did not produce an audio file for {video_id} in {}",
        dest_dir.display()
    )
}
