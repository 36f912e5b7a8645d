//! Video references parsed from user-supplied URLs.

use crate::error::{Result, VidsumError};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^\s*(?:
                # Full YouTube URLs
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/|youtube\.com/shorts/)
                ([a-zA-Z0-9_-]{11})
                (?:[?&\#/].*)?
            |
                # Bare video ID (11 characters)
                ([a-zA-Z0-9_-]{11})
            )\s*$
        ",
        )
        .expect("video id pattern is valid")
    })
}

/// A single video: its platform id and a normalized watch URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VideoReference {
    id: String,
    url: String,
}

impl VideoReference {
    /// Parse a watch/short/embed URL or a bare 11-character id.
    pub fn parse(input: &str) -> Result<Self> {
        let caps = video_id_regex().captures(input).ok_or_else(|| {
            VidsumError::Validation(format!("Not a recognised YouTube video URL: {}", input))
        })?;

        let id = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| VidsumError::Validation(format!("No video id in: {}", input)))?;

        Ok(Self::from_id(id))
    }

    fn from_id(id: String) -> Self {
        let url = format!("https://www.youtube.com/watch?v={}", id);
        Self { id, url }
    }

    /// Platform video id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Normalized watch URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Display for VideoReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_forms() {
        for input in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "dQw4w9WgXcQ",
            "  dQw4w9WgXcQ  ",
        ] {
            let reference = VideoReference::parse(input).unwrap();
            assert_eq!(reference.id(), "dQw4w9WgXcQ", "input: {input}");
            assert_eq!(reference.url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        }
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        for input in [
            "",
            "not-a-video-id",
            "https://vimeo.com/123456789",
            "https://www.youtube.com/@SomeHandle",
            "see https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=short",
        ] {
            let err = VideoReference::parse(input).unwrap_err();
            assert!(matches!(err, VidsumError::Validation(_)), "input: {input}");
        }
    }

    #[test]
    fn test_parse_is_deterministic() {
        let a = VideoReference::parse("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let b = VideoReference::parse("dQw4w9WgXcQ").unwrap();
        assert_eq!(a, b);
    }
}
