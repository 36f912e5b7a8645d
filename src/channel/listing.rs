//! Video listing entries produced by channel resolution.

use crate::source::PlatformEntry;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// One video in a channel listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoListingEntry {
    pub id: String,
    pub title: String,
    pub url: String,
    /// `YYYY-MM-DD`, or empty when the platform gave no usable date.
    pub upload_date: String,
    pub duration: Option<f64>,
    pub view_count: Option<u64>,
    pub description: String,
}

impl VideoListingEntry {
    /// Convert a platform entry; entries without an id are dropped.
    pub fn from_platform(entry: PlatformEntry) -> Option<Self> {
        let id = entry.id.filter(|id| !id.trim().is_empty())?;
        Some(Self {
            url: format!("https://www.youtube.com/watch?v={id}"),
            upload_date: format_upload_date(entry.upload_date.as_deref()),
            title: entry.title.unwrap_or_default(),
            duration: entry.duration,
            view_count: entry.view_count,
            description: entry.description.unwrap_or_default(),
            id,
        })
    }
}

/// Reformat a compact `YYYYMMDD` date as `YYYY-MM-DD`; anything else becomes empty.
pub fn format_upload_date(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|d| d.len() == 8 && d.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y%m%d").ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Convert platform entries and order them newest first.
///
/// Ordering is a plain descending string comparison of `upload_date`, so
/// undated entries end up last. Ties keep platform order.
pub fn into_listing(entries: Vec<PlatformEntry>) -> Vec<VideoListingEntry> {
    let total = entries.len();
    let mut videos: Vec<_> = entries
        .into_iter()
        .filter_map(VideoListingEntry::from_platform)
        .collect();

    if videos.len() < total {
        debug!("Dropped {} entries without an id", total - videos.len());
    }

    videos.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
    videos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, date: Option<&str>) -> PlatformEntry {
        PlatformEntry {
            id: Some(id.to_string()),
            upload_date: date.map(str::to_string),
            ..PlatformEntry::default()
        }
    }

    #[test]
    fn test_format_upload_date() {
        assert_eq!(format_upload_date(Some("20230415")), "2023-04-15");
        assert_eq!(format_upload_date(Some("2023-04-15")), "");
        assert_eq!(format_upload_date(Some("20231340")), "");
        assert_eq!(format_upload_date(Some("2023041")), "");
        assert_eq!(format_upload_date(None), "");
    }

    #[test]
    fn test_undated_entries_sort_last() {
        let videos = into_listing(vec![
            entry("a", None),
            entry("b", Some("20230101")),
            entry("c", Some("20220101")),
        ]);

        let dates: Vec<_> = videos.iter().map(|v| v.upload_date.as_str()).collect();
        assert_eq!(dates, ["2023-01-01", "2022-01-01", ""]);
    }

    #[test]
    fn test_equal_dates_keep_platform_order() {
        let videos = into_listing(vec![
            entry("first", Some("20240101")),
            entry("second", Some("20240101")),
        ]);
        assert_eq!(videos[0].id, "first");
        assert_eq!(videos[1].id, "second");
    }

    #[test]
    fn test_conversion() {
        let video = VideoListingEntry::from_platform(PlatformEntry {
            id: Some("dQw4w9WgXcQ".into()),
            title: Some("Never Gonna".into()),
            url: Some("dQw4w9WgXcQ".into()),
            upload_date: Some("20091025".into()),
            duration: Some(212.0),
            view_count: Some(1_000),
            ..PlatformEntry::default()
        })
        .unwrap();

        assert_eq!(video.url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(video.upload_date, "2009-10-25");
        assert_eq!(video.duration, Some(212.0));
        assert_eq!(video.description, "");

        assert!(VideoListingEntry::from_platform(PlatformEntry::default()).is_none());
    }
}
