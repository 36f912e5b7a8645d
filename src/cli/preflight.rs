//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::error::{Result, VidsumError};
use crate::openai::is_api_key_configured;
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Summarizing needs the downloader, ffmpeg tools and an API key.
    Summarize,
    /// Channel listing only needs the downloader.
    Channel,
}

impl Operation {
    /// External tools this operation shells out to.
    pub fn tools(self) -> &'static [&'static str] {
        match self {
            Operation::Summarize => &["yt-dlp", "ffmpeg", "ffprobe"],
            Operation::Channel => &["yt-dlp"],
        }
    }

    fn needs_api_key(self) -> bool {
        matches!(self, Operation::Summarize)
    }
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    if operation.needs_api_key() && !is_api_key_configured() {
        return Err(VidsumError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        ));
    }
    for tool in operation.tools() {
        check_tool(tool)?;
    }
    Ok(())
}

/// Version flag understood by `name`.
pub(crate) fn version_arg(name: &str) -> &'static str {
    match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg(version_arg(name)).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(VidsumError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VidsumError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(VidsumError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
