//! yt-dlp backed platform search.

use super::{PlatformEntry, PlatformSearch};
use crate::error::{Result, VidsumError};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Platform search that shells out to yt-dlp in flat-playlist mode.
pub struct YtDlpSearch {
    binary: String,
}

impl YtDlpSearch {
    pub fn new() -> Self {
        Self::with_binary("yt-dlp")
    }

    /// Use a specific yt-dlp executable.
    pub fn with_binary(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }

    /// Run yt-dlp in JSON-lines flat mode against `target`.
    async fn dump_flat(&self, target: &str, limit: usize) -> Result<Vec<PlatformEntry>> {
        let limit_str = limit.to_string();

        let output = Command::new(&self.binary)
            .args([
                "--dump-json",
                "--flat-playlist",
                "--no-download",
                "--no-warnings",
                "--playlist-end",
                &limit_str,
                target,
            ])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VidsumError::ToolNotFound(self.binary.clone())
                } else {
                    VidsumError::ToolFailed(format!("Failed to run {}: {}", self.binary, e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidsumError::ToolFailed(format!(
                "{} failed for {}: {}",
                self.binary,
                target,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let entries = parse_entries(&stdout);
        debug!("{} returned {} entries", target, entries.len());
        Ok(entries)
    }
}

impl Default for YtDlpSearch {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse yt-dlp `--dump-json` output, one JSON object per line.
///
/// Lines that aren't objects (progress noise, `null` placeholders) are skipped.
fn parse_entries(stdout: &str) -> Vec<PlatformEntry> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| serde_json::from_str::<PlatformEntry>(line).ok())
        .collect()
}

#[async_trait]
impl PlatformSearch for YtDlpSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PlatformEntry>> {
        let limit = limit.max(1);
        let target = format!("ytsearch{}:{}", limit, query);
        self.dump_flat(&target, limit).await
    }

    #[instrument(skip(self))]
    async fn list_channel_videos(
        &self,
        listing_url: &str,
        limit: usize,
    ) -> Result<Vec<PlatformEntry>> {
        self.dump_flat(listing_url, limit.max(1)).await
    }
}
