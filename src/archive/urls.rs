//! Wayback Machine URL construction and plays.tv URL classification.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Capture used when a page or file has no snapshot timestamp of its own.
/// The archive redirects to the nearest capture, and this one predates the shutdown.
pub const FALLBACK_TIMESTAMP: &str = "20191210043532";

/// Host the recovered pages were served from.
const SITE_ROOT: &str = "https://plays.tv/";

// `/web/{timestamp}{modifier}/{original}` with or without the archive host.
static WAYBACK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:https?:)?//web\.archive\.org)?/web/(\d{1,14})([a-z]{2}_)?/(.+)$").unwrap()
});

/// Kind of page an archived URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// A single video page (`/video/{id}/{slug}`).
    VideoPage,
    /// The account's profile or one of its listing pages.
    Profile,
    /// Anything else.
    Other,
}

/// Build the archive URL of a capture.
pub fn snapshot_url(wayback_base: &str, timestamp: &str, original: &str) -> String {
    format!("{}/{}/{}", wayback_base.trim_end_matches('/'), timestamp, original)
}

/// Build the raw-content URL of a capture (no toolbar, no link rewriting).
pub fn raw_snapshot_url(wayback_base: &str, timestamp: &str, original: &str) -> String {
    format!(
        "{}/{}id_/{}",
        wayback_base.trim_end_matches('/'),
        timestamp,
        original
    )
}

/// Build the URL of the nearest capture of `original`.
pub fn nearest_capture_url(wayback_base: &str, original: &str) -> String {
    format!("{}/{}", wayback_base.trim_end_matches('/'), original)
}

/// Split a Wayback URL into its timestamp and original URL.
pub fn split_wayback_url(url: &str) -> Option<(&str, &str)> {
    let captures = WAYBACK_PATTERN.captures(url)?;
    Some((captures.get(1)?.as_str(), captures.get(3)?.as_str()))
}

/// Make a scraped URL absolute, resolving against `base` when relative.
pub fn absolutize(href: &str, base: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }

    if let Ok(url) = Url::parse(href) {
        return Some(url.to_string());
    }

    Url::parse(base)
        .and_then(|base| base.join(href))
        .ok()
        .map(|u| u.to_string())
}

/// Point a scraped video URL at the archive's raw copy of the file.
///
/// Archived pages reference the file either through a rewritten Wayback URL or
/// directly on the long-gone CDN; both are turned into raw-content archive URLs.
pub fn archived_file_url(video_url: &str, wayback_base: &str, timestamp: Option<&str>) -> String {
    if let Some((ts, original)) = split_wayback_url(video_url) {
        let original = absolutize(original, SITE_ROOT).unwrap_or_else(|| original.to_string());
        return raw_snapshot_url(wayback_base, ts, &original);
    }

    raw_snapshot_url(
        wayback_base,
        timestamp.unwrap_or(FALLBACK_TIMESTAMP),
        video_url,
    )
}

/// Canonical form of a plays.tv page URL: https, no Wayback prefix, no query,
/// no fragment, no trailing slash.
pub fn canonical_page_url(href: &str) -> Option<String> {
    let href = match split_wayback_url(href.trim()) {
        Some((_, original)) => original,
        None => href.trim(),
    };

    let absolute = absolutize(href, SITE_ROOT)?;
    let mut url = Url::parse(&absolute).ok()?;
    if url.scheme() == "http" {
        url.set_scheme("https").ok()?;
    }
    url.set_query(None);
    url.set_fragment(None);

    let host = url.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    url.set_host(Some(host.as_str())).ok()?;

    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&path);

    Some(url.to_string())
}

/// Path segments of a URL, ignoring empty segments.
fn path_segments(url: &str) -> Vec<String> {
    let Some(canonical) = canonical_page_url(url) else {
        return Vec::new();
    };
    Url::parse(&canonical)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .map(|s| s.filter(|p| !p.is_empty()).map(str::to_string).collect())
        })
        .unwrap_or_default()
}

/// Identifier and slug of a video page.
///
/// Video pages live at `/video/{id}/{slug}` or under a profile at
/// `/u/{account}/video/{id}/{slug}`.
pub fn video_page_parts(url: &str) -> Option<(String, Option<String>)> {
    let segments = path_segments(url);
    let rest = match segments.as_slice() {
        [video, rest @ ..] if video == "video" => rest,
        [u, _, video, rest @ ..] if u == "u" && video == "video" => rest,
        _ => return None,
    };

    let id = rest.first()?.clone();
    let slug = rest.get(1).cloned();
    Some((id, slug))
}

/// Classify an original (unarchived) URL relative to an account.
pub fn classify(original: &str, account: &str) -> SnapshotKind {
    if video_page_parts(original).is_some() {
        return SnapshotKind::VideoPage;
    }

    let segments = path_segments(original);
    match segments.as_slice() {
        [u, name, ..] if u == "u" && name.eq_ignore_ascii_case(account) => SnapshotKind::Profile,
        _ => SnapshotKind::Other,
    }
}

/// Whether an original URL lies under a profile path prefix such as `plays.tv/u/name`.
///
/// The character after the prefix must end the path segment, so `u/name2`
/// does not match `u/name`.
pub fn is_under_profile(original: &str, profile_path: &str) -> bool {
    let stripped = original
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");
    let prefix = profile_path.trim_end_matches('/');

    if stripped.len() < prefix.len() || !stripped.is_char_boundary(prefix.len()) {
        return false;
    }

    let (head, rest) = stripped.split_at(prefix.len());
    head.eq_ignore_ascii_case(prefix)
        && matches!(rest.chars().next(), None | Some('/') | Some('?') | Some('#') | Some(':'))
}
