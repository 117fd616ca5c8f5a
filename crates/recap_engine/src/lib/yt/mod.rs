pub mod audio_fetcher;
pub mod resolver;

use std::{
    fmt::Debug,
    future::Future,
    path::{Path, PathBuf},
};

/// Browser-looking user agent; YouTube throttles the default reqwest/yt-dlp
/// agents much more aggressively.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Video id + title extracted from a submitted URL.
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
}

pub trait MetadataResolver {
    type Error: Debug;

    fn resolve(
        &self,
        video_url: &str,
    ) -> impl Future<Output = Result<VideoMetadata, Self::Error>> + Send;
}

/// Downloads the audio track of a video. Internal collaborator of the
/// transcription adapter; the pipeline never sees it.
pub trait AudioFetcher {
    /// Fetches the audio for `video_id` into `dest_dir` and returns the
    /// produced file.
    fn fetch(
        &self,
        video_url: &str,
        video_id: &str,
        dest_dir: &Path,
    ) -> impl Future<Output = anyhow::Result<PathBuf>> + Send;

    /// Removes whatever `fetch` left behind for `video_id`.
    fn clean_up(&self, video_id: &str, dest_dir: &Path) -> anyhow::Result<()>;
}
