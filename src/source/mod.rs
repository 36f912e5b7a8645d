//! Video platform abstraction for Vidsum.
//!
//! Holds the video reference type, the entry shape returned by platform
//! searches and listings, and the search capability trait.

mod reference;
mod youtube;

pub use reference::VideoReference;
pub use youtube::YtDlpSearch;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One entry from a platform search or channel listing.
///
/// Every field is optional because flat listings only carry what the
/// platform page exposed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub uploader: Option<String>,
    pub uploader_url: Option<String>,
    pub channel_url: Option<String>,
    /// Compact `YYYYMMDD` form as reported by the platform.
    pub upload_date: Option<String>,
    pub duration: Option<f64>,
    pub view_count: Option<u64>,
    pub description: Option<String>,
}

impl PlatformEntry {
    /// The uploader's channel page, as declared by the entry.
    pub fn uploader_endpoint(&self) -> Option<&str> {
        [&self.uploader_url, &self.channel_url]
            .into_iter()
            .filter_map(|u| u.as_deref().map(str::trim))
            .find(|u| !u.is_empty())
    }
}

/// Search and listing capability of a video platform.
///
/// An `Err` means the call itself failed (network, extractor, missing tool);
/// a query that simply matched nothing is `Ok(vec![])`.
#[async_trait]
pub trait PlatformSearch: Send + Sync {
    /// Flat search for `query`, returning at most `limit` entries in platform order.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PlatformEntry>>;

    /// Flat listing of a channel's uploads page, at most `limit` entries.
    async fn list_channel_videos(&self, listing_url: &str, limit: usize)
        -> Result<Vec<PlatformEntry>>;
}
