//! Video page and video record representation.

use crate::archive::urls::{canonical_page_url, nearest_capture_url, video_page_parts};
use crate::archive::Snapshot;

/// An archived plays.tv video page to recover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPage {
    /// Canonical page URL. Unique per page.
    pub url: String,

    /// Archive URL the page is fetched from.
    pub fetch_url: String,

    /// Capture timestamp, when fetched from a known capture.
    pub timestamp: Option<String>,

    /// Video identifier from the page path.
    pub id: String,

    /// Title slug from the page path.
    pub slug: Option<String>,
}

impl VideoPage {
    /// A video page captured directly in the index.
    pub fn from_snapshot(snapshot: &Snapshot) -> Option<Self> {
        let url = canonical_page_url(&snapshot.original)?;
        let (id, slug) = video_page_parts(&url)?;

        Some(Self {
            url,
            fetch_url: snapshot.archive_url.clone(),
            timestamp: Some(snapshot.timestamp.clone()),
            id,
            slug,
        })
    }

    /// A video page linked from an archived profile, fetched from its nearest capture.
    pub fn from_link(href: &str, wayback_base: &str) -> Option<Self> {
        let url = canonical_page_url(href)?;
        let (id, slug) = video_page_parts(&url)?;

        Some(Self {
            fetch_url: nearest_capture_url(wayback_base, &url),
            url,
            timestamp: None,
            id,
            slug,
        })
    }

    /// Short name for display.
    pub fn label(&self) -> &str {
        self.slug.as_deref().unwrap_or(&self.id)
    }
}

/// A resolved video file ready to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    /// Page the video was found on.
    pub page: VideoPage,

    /// Archive URL of the video file.
    pub video_url: String,

    /// Local filename, relative to the account folder.
    pub filename: String,
}
