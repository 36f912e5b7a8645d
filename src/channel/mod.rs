//! Channel video discovery.
//!
//! Resolving a free-form channel query runs a fixed cascade:
//!
//! 1. **Direct URL**: the query already is a channel URL; no search is made.
//! 2. **Search match**: search for `"<query> channel"` and take the first
//!    channel-shaped result URL, else the first result's uploader page.
//! 3. **Heuristic URL**: only when the stage 2 search itself failed, guess
//!    `@<query without whitespace>`.
//! 4. **Listing fetch**: list the endpoint's uploads, retrying once with the
//!    `/c/` form of an `@handle` endpoint.
//! 5. **Direct search**: search the raw query and keep videos whose uploader
//!    name contains it.
//!
//! Finding nothing is an empty listing. Only a transport failure in the last
//! stage becomes an error.

mod endpoint;
mod listing;

pub use endpoint::ChannelEndpoint;
pub use listing::{format_upload_date, VideoListingEntry};

use crate::config::ChannelSettings;
use crate::error::{Result, VidsumError};
use crate::source::{PlatformEntry, PlatformSearch};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Cascade stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    DirectUrl,
    SearchMatch,
    HeuristicUrl,
    ListingFetch,
    DirectSearch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::DirectUrl => "direct URL",
            Stage::SearchMatch => "search match",
            Stage::HeuristicUrl => "heuristic URL",
            Stage::ListingFetch => "listing fetch",
            Stage::DirectSearch => "direct search",
        };
        f.write_str(name)
    }
}

/// Result of one stage. Transport failures are kept apart from "nothing
/// here" because they steer which stage runs next.
#[derive(Debug)]
pub enum StageOutcome<T> {
    Resolved(T),
    NotFound,
    TransportError(VidsumError),
}

impl<T> StageOutcome<Vec<T>> {
    fn from_entries(result: Result<Vec<T>>) -> Self {
        match result {
            Ok(entries) if entries.is_empty() => Self::NotFound,
            Ok(entries) => Self::Resolved(entries),
            Err(e) => Self::TransportError(e),
        }
    }
}

/// Resolved channel listing with how it was obtained.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelListing {
    pub query: String,
    /// Listing URL the videos came from; `None` for the direct-search fallback.
    pub endpoint: Option<String>,
    /// Stage that produced the endpoint, if one was found.
    pub endpoint_stage: Option<Stage>,
    /// Stage that produced the videos.
    pub stage: Stage,
    pub videos: Vec<VideoListingEntry>,
}

/// Runs the resolution cascade over a [`PlatformSearch`].
pub struct ChannelResolver {
    search: Arc<dyn PlatformSearch>,
    settings: ChannelSettings,
}

impl ChannelResolver {
    pub fn new(search: Arc<dyn PlatformSearch>, settings: ChannelSettings) -> Self {
        Self { search, settings }
    }

    /// Videos for `query`, newest first, at most `max_results` of them.
    pub async fn resolve_channel_videos(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<VideoListingEntry>> {
        Ok(self.resolve(query, max_results).await?.videos)
    }

    /// Like [`resolve_channel_videos`](Self::resolve_channel_videos), also
    /// reporting which endpoint and stage produced the listing.
    #[instrument(skip(self))]
    pub async fn resolve(&self, query: &str, max_results: usize) -> Result<ChannelListing> {
        let query = query.trim();
        if query.is_empty() {
            return Err(VidsumError::Validation("channel query is empty".to_string()));
        }
        if max_results == 0 {
            return Err(VidsumError::Validation("max results must be at least 1".to_string()));
        }

        let located = self.locate_endpoint(query).await;

        if let Some((endpoint, endpoint_stage)) = &located {
            info!("Resolved endpoint {} via {}", endpoint, endpoint_stage);
            if let Some((listing_url, entries)) = self.fetch_listing(endpoint, max_results).await {
                return Ok(ChannelListing {
                    query: query.to_string(),
                    endpoint: Some(listing_url),
                    endpoint_stage: Some(*endpoint_stage),
                    stage: Stage::ListingFetch,
                    videos: listing::into_listing(entries),
                });
            }
        }

        let entries = self.direct_search(query, max_results).await?;
        Ok(ChannelListing {
            query: query.to_string(),
            endpoint: None,
            endpoint_stage: located.map(|(_, stage)| stage),
            stage: Stage::DirectSearch,
            videos: listing::into_listing(entries),
        })
    }

    /// Stages 1-3.
    async fn locate_endpoint(&self, query: &str) -> Option<(ChannelEndpoint, Stage)> {
        if let Some(endpoint) = ChannelEndpoint::parse(query) {
            return Some((endpoint, Stage::DirectUrl));
        }

        match self.search_match(query).await {
            StageOutcome::Resolved(endpoint) => Some((endpoint, Stage::SearchMatch)),
            StageOutcome::NotFound => {
                info!("No channel found by search for '{}'", query);
                None
            }
            StageOutcome::TransportError(e) => {
                warn!("Channel search failed, guessing handle: {}", e);
                ChannelEndpoint::from_handle(query).map(|ep| (ep, Stage::HeuristicUrl))
            }
        }
    }

    async fn search_match(&self, query: &str) -> StageOutcome<ChannelEndpoint> {
        let hinted = format!("{query} channel");
        let entries = match self.search.search(&hinted, self.settings.search_candidates).await {
            Ok(entries) => entries,
            Err(e) => return StageOutcome::TransportError(e),
        };

        let channel_url = entries
            .iter()
            .filter_map(|e| e.url.as_deref())
            .find_map(ChannelEndpoint::parse);
        if let Some(endpoint) = channel_url {
            return StageOutcome::Resolved(endpoint);
        }

        match entries
            .first()
            .and_then(PlatformEntry::uploader_endpoint)
            .and_then(ChannelEndpoint::declared)
        {
            Some(endpoint) => {
                debug!("Using first result's uploader page {}", endpoint);
                StageOutcome::Resolved(endpoint)
            }
            None => StageOutcome::NotFound,
        }
    }

    /// Stage 4. Returns the listing URL that yielded entries.
    ///
    /// The alternate path is only tried when the first listing is empty; a
    /// transport failure hands over to the direct search.
    async fn fetch_listing(
        &self,
        endpoint: &ChannelEndpoint,
        max_results: usize,
    ) -> Option<(String, Vec<PlatformEntry>)> {
        let candidates = std::iter::once(endpoint.clone()).chain(endpoint.alternate());

        for candidate in candidates {
            let listing_url = candidate.listing_url();
            let outcome = StageOutcome::from_entries(
                self.search.list_channel_videos(&listing_url, max_results).await,
            );
            match outcome {
                StageOutcome::Resolved(mut entries) => {
                    entries.truncate(max_results);
                    info!("Fetched {} videos from {}", entries.len(), listing_url);
                    return Some((listing_url, entries));
                }
                StageOutcome::NotFound => info!("No videos at {}", listing_url),
                StageOutcome::TransportError(e) => {
                    warn!("Listing {} failed: {}", listing_url, e);
                    return None;
                }
            }
        }
        None
    }

    /// Stage 5. Caps at `max_results` before filtering by uploader.
    async fn direct_search(&self, query: &str, max_results: usize) -> Result<Vec<PlatformEntry>> {
        info!("Falling back to direct video search for '{}'", query);

        let mut entries = self
            .search
            .search(query, max_results)
            .await
            .map_err(|e| VidsumError::ChannelResolution {
                query: query.to_string(),
                source: Box::new(e),
            })?;
        entries.truncate(max_results);

        let needle = query.to_lowercase();
        entries.retain(|entry| {
            entry
                .uploader
                .as_deref()
                .is_some_and(|uploader| uploader.to_lowercase().contains(&needle))
        });

        debug!("{} videos matched uploader '{}'", entries.len(), query);
        Ok(entries)
    }
}
