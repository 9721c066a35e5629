//! HTML parsing for archived plays.tv pages.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::archive::urls::{absolutize, archived_file_url, canonical_page_url, video_page_parts};
use crate::error::{Error, Result};
use crate::fs::naming::video_filename;
use crate::media::item::{VideoPage, VideoRecord};

/// Rendition plays.tv served as its main quality.
const PREFERRED_RESOLUTION: u32 = 720;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static SOURCE: LazyLock<Selector> = LazyLock::new(|| selector("source[src]"));
static VIDEO: LazyLock<Selector> = LazyLock::new(|| selector("video[src]"));
static OG_VIDEO: LazyLock<Selector> = LazyLock::new(|| {
    selector(
        r#"meta[property="og:video"], meta[property="og:video:url"], meta[property="og:video:secure_url"]"#,
    )
});
static LISTING_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector(".video-list-container a.title[href]"));
static ANY_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static VIDEO_COUNT: LazyLock<Selector> =
    LazyLock::new(|| selector(".nav-tab-label span, .info-links .section-value"));

fn resolution(element: &ElementRef<'_>) -> Option<u32> {
    element
        .value()
        .attr("res")
        .and_then(|r| r.trim().trim_end_matches('p').parse().ok())
}

/// Find the embedded video URL in a video page.
///
/// Prefers the 720p `<source>`, then the highest-resolution `<source>`, then
/// any `<video>`/`<source>` URL, then the `og:video` meta tags. Returns `None`
/// when the page has no video markup.
pub fn extract_video_url(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let sources: Vec<(Option<u32>, &str)> = document
        .select(&SOURCE)
        .filter_map(|el| {
            let src = el.value().attr("src")?.trim();
            (!src.is_empty()).then_some((resolution(&el), src))
        })
        .collect();

    let chosen = sources
        .iter()
        .find(|(res, _)| *res == Some(PREFERRED_RESOLUTION))
        .or_else(|| {
            sources
                .iter()
                .filter(|(res, _)| res.is_some())
                .max_by_key(|(res, _)| *res)
        })
        .map(|(_, src)| *src)
        .or_else(|| document.select(&VIDEO).find_map(|el| el.value().attr("src")))
        .or_else(|| sources.first().map(|(_, src)| *src))
        .or_else(|| {
            document
                .select(&OG_VIDEO)
                .find_map(|el| el.value().attr("content"))
        })?;

    absolutize(chosen, page_url)
}

/// Resolve a fetched video page into a download record.
///
/// Fails with [`Error::Parse`] when the page has no video markup.
pub fn build_record(page: &VideoPage, html: &str, wayback_base: &str) -> Result<VideoRecord> {
    let found = extract_video_url(html, &page.fetch_url).ok_or_else(|| {
        Error::Parse(format!("No video source found on {}", page.url))
    })?;

    let video_url = archived_file_url(&found, wayback_base, page.timestamp.as_deref());
    let filename = video_filename(page, &video_url)?;

    Ok(VideoRecord {
        page: page.clone(),
        video_url,
        filename,
    })
}

/// Collect canonical video page URLs linked from an archived profile page.
///
/// Uses the profile's video listing when present and falls back to every
/// link on the page that points at a video. Order is preserved, duplicates
/// are dropped.
pub fn harvest_video_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let collect = |selector: &Selector| -> Vec<String> {
        let mut seen = HashSet::new();
        document
            .select(selector)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(canonical_page_url)
            .filter(|url| video_page_parts(url).is_some())
            .filter(|url| seen.insert(url.clone()))
            .collect()
    };

    let listed = collect(&LISTING_LINK);
    if !listed.is_empty() {
        return listed;
    }

    collect(&ANY_LINK)
}

/// Number of videos the profile page says the account has.
pub fn listed_video_count(html: &str) -> Option<u64> {
    let document = Html::parse_document(html);

    document.select(&VIDEO_COUNT).find_map(|el| {
        let text: String = el.text().collect();
        text.trim().replace(',', "").parse().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://web.archive.org/web";
    const PAGE: &str = "https://web.archive.org/web/20191001000000/https://plays.tv/video/5d0c1/clip";

    fn page() -> VideoPage {
        VideoPage {
            url: "https://plays.tv/video/5d0c1/clip".to_string(),
            fetch_url: PAGE.to_string(),
            timestamp: Some("20191001000000".to_string()),
            id: "5d0c1".to_string(),
            slug: Some("clip".to_string()),
        }
    }

    #[test]
    fn test_prefers_720p_source() {
        let html = r#"<video>
            <source res="1080" src="//cdn.example/v/1080.mp4">
            <source res="720" src="//cdn.example/v/720.mp4">
            <source res="480" src="//cdn.example/v/480.mp4">
        </video>"#;
        assert_eq!(
            extract_video_url(html, PAGE).as_deref(),
            Some("https://cdn.example/v/720.mp4")
        );
    }

    #[test]
    fn test_falls_back_to_highest_resolution() {
        let html = r#"<video>
            <source res="480" src="//cdn.example/v/480.mp4">
            <source res="1080p" src="//cdn.example/v/1080.mp4">
        </video>"#;
        assert_eq!(
            extract_video_url(html, PAGE).as_deref(),
            Some("https://cdn.example/v/1080.mp4")
        );
    }

    #[test]
    fn test_video_tag_and_og_fallbacks() {
        let html = r#"<video src="/web/20191001000000/https://cdn.example/v/main.mp4"></video>"#;
        assert_eq!(
            extract_video_url(html, PAGE).as_deref(),
            Some("https://web.archive.org/web/20191001000000/https://cdn.example/v/main.mp4")
        );

        let html = r#"<html><head>
            <meta property="og:video" content="https://cdn.example/v/og.mp4">
        </head></html>"#;
        assert_eq!(
            extract_video_url(html, PAGE).as_deref(),
            Some("https://cdn.example/v/og.mp4")
        );
    }

    #[test]
    fn test_no_video_marker_yields_nothing() {
        let html = r#"<html><body><h1>This video is unavailable</h1>
            <source res="720"></body></html>"#;
        assert_eq!(extract_video_url(html, PAGE), None);

        let err = build_record(&page(), html, BASE).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_build_record() {
        let html = r#"<source res="720" src="//cdn.example/v/720.mp4">"#;
        let record = build_record(&page(), html, BASE).unwrap();
        assert_eq!(
            record.video_url,
            "https://web.archive.org/web/20191001000000id_/https://cdn.example/v/720.mp4"
        );
        assert_eq!(record.filename, "clip_5d0c1.mp4");
        assert_eq!(record.page, page());
    }

    #[test]
    fn test_harvest_listing_links() {
        let html = r#"<div class="bd"><div class="video-list-container">
            <a class="title" href="/web/20191001000000/https://plays.tv/video/aaa/first?from=user">First</a>
            <a class="title" href="https://plays.tv/video/bbb/second">Second</a>
            <a class="title" href="https://plays.tv/video/aaa/first?from=other">First again</a>
            <a class="thumb" href="https://plays.tv/video/ccc/thumb-only">Thumb</a>
        </div></div>
        <a href="https://plays.tv/video/zzz/sidebar">Sidebar</a>"#;

        assert_eq!(
            harvest_video_links(html),
            vec![
                "https://plays.tv/video/aaa/first".to_string(),
                "https://plays.tv/video/bbb/second".to_string(),
            ]
        );
    }

    #[test]
    fn test_harvest_falls_back_to_all_links() {
        let html = r#"<a href="https://plays.tv/u/gamer">Profile</a>
            <a href="//plays.tv/video/ccc/clip">Clip</a>"#;
        assert_eq!(
            harvest_video_links(html),
            vec!["https://plays.tv/video/ccc/clip".to_string()]
        );
        assert!(harvest_video_links("<p>nothing</p>").is_empty());
    }

    #[test]
    fn test_listed_video_count() {
        let html = r#"<div class="nav-tab-label">Videos <span> 1,204 </span></div>"#;
        assert_eq!(listed_video_count(html), Some(1204));

        let html = r#"<div class="info-links"><span class="section-value">12</span></div>"#;
        assert_eq!(listed_video_count(html), Some(12));

        assert_eq!(listed_video_count("<p>none</p>"), None);
    }
}
