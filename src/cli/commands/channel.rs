//! Channel command implementation.

use crate::channel::ChannelResolver;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::VidsumError;
use crate::source::YtDlpSearch;
use anyhow::Result;
use std::sync::Arc;

/// Run the channel command.
pub async fn run_channel(query: &str, limit: Option<usize>, json: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Channel) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vidsum doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let max_results = limit.unwrap_or(settings.channel.default_max_results);
    let resolver = ChannelResolver::new(Arc::new(YtDlpSearch::new()), settings.channel.clone());

    let spinner = Output::spinner(&format!("Looking up channel '{}'", query));
    let lookup = resolver.resolve(query, max_results);
    let listing = match settings.pipeline.stage_timeout() {
        Some(budget) => tokio::time::timeout(budget, lookup).await.unwrap_or_else(|elapsed| {
            Err(VidsumError::ChannelResolution {
                query: query.to_string(),
                source: Box::new(elapsed),
            })
        }),
        None => lookup.await,
    };
    spinner.finish_and_clear();

    let listing = match listing {
        Ok(listing) => listing,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if listing.videos.is_empty() {
        Output::warning(&format!("No videos found for '{}'", query));
        return Ok(());
    }

    Output::header(&format!("{} video(s) for '{}'", listing.videos.len(), listing.query));
    match &listing.endpoint {
        Some(endpoint) => Output::kv("Source", endpoint),
        None => Output::kv("Source", &format!("{} (uploader match)", listing.stage)),
    }
    println!();
    for video in &listing.videos {
        Output::video_item(&video.title, &video.upload_date, video.duration, &video.url);
    }

    Ok(())
}
