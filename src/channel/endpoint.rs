//! Channel endpoint URLs.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use url::Url;

const CHANNEL_BASE: &str = "https://www.youtube.com";
const LISTING_SUFFIX: &str = "/videos";

fn channel_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^(?:https?://)?
            (?:www\.|m\.)?
            youtube\.com/
            (
                @[^/\s?\#]+
              | (?:channel|c|user)/[^/\s?\#]+
            )",
        )
        .expect("channel pattern is valid")
    })
}

/// A channel's home page, e.g. `https://www.youtube.com/@handle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEndpoint {
    url: String,
}

impl ChannelEndpoint {
    /// Recognise a channel URL (`@handle`, `channel/`, `c/` or `user/`).
    ///
    /// The result is canonical: https, `www.` host, no trailing path, query
    /// or fragment.
    pub fn parse(input: &str) -> Option<Self> {
        let caps = channel_pattern().captures(input.trim())?;
        Some(Self {
            url: format!("{CHANNEL_BASE}/{}", &caps[1]),
        })
    }

    /// Accept an uploader URL declared by a platform entry.
    ///
    /// Channel-shaped URLs are canonicalised; any other absolute http(s) URL
    /// is taken as-is minus query, fragment and a trailing `/videos`.
    pub fn declared(input: &str) -> Option<Self> {
        if let Some(endpoint) = Self::parse(input) {
            return Some(endpoint);
        }

        let mut url = Url::parse(input.trim()).ok()?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return None;
        }
        url.set_query(None);
        url.set_fragment(None);

        let text = url.as_str().trim_end_matches('/');
        let text = text.strip_suffix(LISTING_SUFFIX).unwrap_or(text);
        Some(Self {
            url: text.to_string(),
        })
    }

    /// Guess an endpoint by treating `query` as an `@handle`.
    pub fn from_handle(query: &str) -> Option<Self> {
        let handle: String = query.chars().filter(|c| !c.is_whitespace()).collect();
        let handle = handle.trim_start_matches('@');
        if handle.is_empty() || handle.contains(['/', '?', '#']) {
            return None;
        }
        Some(Self {
            url: format!("{CHANNEL_BASE}/@{handle}"),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The channel's uploads page.
    pub fn listing_url(&self) -> String {
        format!("{}{LISTING_SUFFIX}", self.url)
    }

    /// `/c/` form of an `@handle` endpoint.
    pub fn alternate(&self) -> Option<Self> {
        self.url.contains("/@").then(|| Self {
            url: self.url.replacen("/@", "/c/", 1),
        })
    }
}

impl fmt::Display for ChannelEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
