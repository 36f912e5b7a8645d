//! yt-dlp audio downloader.
//!
//! Downloads the best available audio stream and has yt-dlp's ffmpeg
//! post-processor transcode it to the configured format. Output files are
//! named `<video id>.<format>`.

use super::MediaDownloader;
use crate::error::{Result, VidsumError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Downloader that shells out to yt-dlp (and ffmpeg when the container needs fixing).
pub struct YtDlpDownloader {
    binary: String,
    audio_format: String,
    audio_quality: String,
}

impl YtDlpDownloader {
    pub fn new(audio_format: &str, audio_quality: &str) -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            audio_format: audio_format.to_string(),
            audio_quality: audio_quality.to_string(),
        }
    }

    /// Use a specific yt-dlp executable.
    pub fn with_binary(mut self, binary: &str) -> Self {
        self.binary = binary.to_string();
        self
    }
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self::new("mp3", "192K")
    }
}

#[async_trait]
impl MediaDownloader for YtDlpDownloader {
    #[instrument(skip(self, destination_dir), fields(dir = %destination_dir.display()))]
    async fn fetch_best_audio(&self, url: &str, destination_dir: &Path) -> Result<PathBuf> {
        info!("Downloading audio from {}", url);

        let template = destination_dir.join("%(id)s.%(ext)s");

        let result = Command::new(&self.binary)
            .arg("--format").arg("bestaudio/best")
            .arg("--extract-audio")
            .arg("--audio-format").arg(&self.audio_format)
            .arg("--audio-quality").arg(&self.audio_quality)
            .arg("--output").arg(&template)
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--no-simulate")
            .arg("--print").arg("after_move:filepath")
            .arg(url)
            .kill_on_drop(true)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VidsumError::ToolNotFound(self.binary.clone()));
            }
            Err(e) => {
                return Err(VidsumError::ToolFailed(format!("{} execution failed: {e}", self.binary)));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidsumError::ToolFailed(format!("{} failed: {}", self.binary, stderr.trim())));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reported = reported_path(&stdout).ok_or_else(|| {
            VidsumError::ToolFailed(format!("{} did not report an output file", self.binary))
        })?;
        debug!("yt-dlp reported {}", reported.display());

        let has_target_ext = reported
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.audio_format));
        if has_target_ext || !reported.exists() {
            return Ok(reported);
        }

        // Post-processor left another container behind; convert it ourselves.
        let target = reported.with_extension(&self.audio_format);
        normalize_audio(&reported, &target).await?;
        remove_intermediate(&reported);
        Ok(target)
    }
}

/// Delete the container yt-dlp left behind. Returns whether it is gone.
fn remove_intermediate(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => {
            warn!("Failed to remove intermediate file {}: {}", path.display(), e);
            false
        }
    }
}

/// Last non-empty line of yt-dlp's `--print` output.
fn reported_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .map(PathBuf::from)
}

/// Converts an audio file to the container implied by `dest`'s extension using ffmpeg.
async fn normalize_audio(source: &Path, dest: &Path) -> Result<()> {
    debug!("Converting {:?} to {:?}", source, dest);

    let result = Command::new("ffmpeg")
        .arg("-i").arg(source)
        .arg("-vn")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(VidsumError::ToolFailed(format!("ffmpeg conversion failed: {err}")))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VidsumError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(VidsumError::ToolFailed(format!("ffmpeg error: {e}"))),
    }
}
