//! Error types for Vidsum.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed underlying cause carried by stage errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Library-level error type for Vidsum operations.
///
/// Stage variants keep the failure that caused them as a `source`, so callers
/// can walk the chain instead of parsing messages.
#[derive(Error, Debug)]
pub enum VidsumError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Cannot create output directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No write permission for directory {}", .0.display())]
    Permission(PathBuf),

    #[error("Resource acquisition failed: {message}")]
    ResourceAcquisition {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Audio file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Transcription failed: {message}")]
    Transcription {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Summarization failed: {message}")]
    Summarization {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Channel resolution failed for '{query}'")]
    ChannelResolution {
        query: String,
        #[source]
        source: BoxError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

impl VidsumError {
    /// Wrap a capability failure raised while acquiring audio.
    pub fn acquisition(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::ResourceAcquisition {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Wrap a capability failure raised while transcribing.
    pub fn transcription(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transcription {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Wrap a generation failure raised while summarizing.
    pub fn summarization(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Summarization {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Whether the caller can fix this by changing the input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias for Vidsum operations.
pub type Result<T> = std::result::Result<T, VidsumError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_stage_errors_keep_their_cause() {
        let cause = VidsumError::ToolFailed("yt-dlp exited with 1".to_string());
        let err = VidsumError::acquisition("download failed", cause);

        let source = err.source().expect("cause should be chained");
        assert!(source.to_string().contains("yt-dlp exited with 1"));
        assert!(err.to_string().starts_with("Resource acquisition failed"));
    }

    #[test]
    fn test_only_validation_is_user_error() {
        assert!(VidsumError::Validation("bad url".into()).is_user_error());
        assert!(!VidsumError::Permission(PathBuf::from("/root")).is_user_error());
    }
}
