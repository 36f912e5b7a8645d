//! Splitting long audio into upload-sized segments.

use crate::error::{Result, VidsumError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// One piece of a split audio file.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    pub path: PathBuf,
    /// Start of the segment within the source, in seconds.
    pub offset: f64,
}

/// Cut `source` into consecutive segments of at most `segment_seconds`.
///
/// Audio that already fits is returned as a single segment pointing at the
/// source itself; nothing is written in that case. Segment files go into
/// `scratch_dir`, which the caller owns.
#[instrument(skip_all, fields(source = %source.display()))]
pub async fn split_audio(
    source: &Path,
    scratch_dir: &Path,
    segment_seconds: u32,
) -> Result<Vec<AudioSegment>> {
    let total = probe_duration(source).await?;
    info!("Audio duration: {:.1}s", total);

    let windows = plan_segments(total, segment_seconds as f64);
    if windows.len() <= 1 {
        return Ok(vec![AudioSegment {
            path: source.to_path_buf(),
            offset: 0.0,
        }]);
    }

    std::fs::create_dir_all(scratch_dir)?;
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    let ext = source
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("mp3");

    let mut segments = Vec::with_capacity(windows.len());
    for (idx, (start, length)) in windows.into_iter().enumerate() {
        let path = scratch_dir.join(format!("{stem}_{idx:04}.{ext}"));
        extract_segment(source, &path, start, length).await?;
        debug!("Segment {} starts at {:.1}s", idx, start);
        segments.push(AudioSegment { path, offset: start });
    }

    info!("Split audio into {} segments", segments.len());
    Ok(segments)
}

/// `(start, length)` windows covering `total` seconds.
fn plan_segments(total: f64, segment: f64) -> Vec<(f64, f64)> {
    if segment <= 0.0 || total <= segment {
        return vec![(0.0, total.max(0.0))];
    }

    let mut windows = Vec::new();
    let mut start = 0.0;
    while start < total {
        windows.push((start, segment.min(total - start)));
        start += segment;
    }
    windows
}

async fn extract_segment(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    let copied = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{start:.3}"))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{length:.3}"))
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("warning")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if matches!(copied, Ok(status) if status.success()) && dest.exists() {
        return Ok(());
    }

    warn!("Stream copy failed, re-encoding segment");

    let encoded = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{start:.3}"))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{length:.3}"))
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("2")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match encoded {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(VidsumError::ToolFailed(format!("segment extraction failed: {err}")))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VidsumError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(VidsumError::ToolFailed(format!("ffmpeg error: {e}"))),
    }
}

#[derive(Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Duration of an audio file in seconds, via ffprobe.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(VidsumError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => return Err(VidsumError::ToolFailed(format!("ffprobe failed: {e}"))),
    };

    if !output.status.success() {
        return Err(VidsumError::ToolFailed("ffprobe returned error".into()));
    }

    parse_probe_duration(&output.stdout)
}

fn parse_probe_duration(stdout: &[u8]) -> Result<f64> {
    let probe: ProbeOutput = serde_json::from_slice(stdout)?;
    probe
        .format
        .duration
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| VidsumError::ToolFailed("could not determine audio duration".into()))
}
