//! Audio acquisition and processing.
//!
//! - `downloader` fetches best-available audio with yt-dlp and normalizes it with ffmpeg.
//! - `split` cuts long files into segments for upload-limited speech APIs.
//! - `artifact` owns the local audio files: single-flight acquisition keyed by
//!   path, reference counted consumers, and cleanup on last release.

mod artifact;
mod downloader;
mod split;

pub use artifact::{ArtifactRegistry, AudioAcquirer, AudioArtifact, ReleaseOutcome};
pub use downloader::YtDlpDownloader;
pub use split::{probe_duration, split_audio, AudioSegment};

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Media download capability.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Download the best available audio for `url` into `destination_dir`,
    /// named by the platform video id, and return the file path it reports.
    async fn fetch_best_audio(&self, url: &str, destination_dir: &Path) -> Result<PathBuf>;
}
