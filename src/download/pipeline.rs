//! Account recovery: snapshot listing, page discovery and concurrent downloads.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar};

use crate::archive::urls::classify;
use crate::archive::{ArchiveFetcher, Snapshot, SnapshotKind, SnapshotLister};
use crate::config::Config;
use crate::dedup::RecoveryCache;
use crate::download::state::RecoveryStats;
use crate::download::video::{DownloadOutcome, Downloader};
use crate::error::Result;
use crate::fs::get_account_folder;
use crate::media::{build_record, harvest_video_links, listed_video_count, VideoPage};
use crate::output::{create_item_bar, create_spinner};

/// What happened to one video page.
#[derive(Debug)]
enum PageOutcome {
    Downloaded { path: PathBuf, bytes: u64 },
    Existing(PathBuf),
    Cached,
}

/// Per-page work shared by all workers.
struct Worker<'a> {
    fetcher: &'a dyn ArchiveFetcher,
    downloader: &'a Downloader,
    cache: Option<&'a RecoveryCache>,
    wayback_base: &'a str,
}

impl Worker<'_> {
    async fn process(&self, page: &VideoPage) -> Result<PageOutcome> {
        if let Some(cache) = self.cache {
            if cache.contains(&page.url).await {
                return Ok(PageOutcome::Cached);
            }
        }

        let html = self.fetcher.fetch_text(&page.fetch_url).await?;
        let record = build_record(page, &html, self.wayback_base)?;

        let outcome = match self.downloader.download(&record).await? {
            DownloadOutcome::Downloaded { path, bytes } => PageOutcome::Downloaded { path, bytes },
            DownloadOutcome::AlreadyExists(path) => PageOutcome::Existing(path),
        };

        if let Some(cache) = self.cache {
            if let Err(e) = cache.add(&page.url).await {
                tracing::warn!("Failed to update cache {}: {}", cache.path().display(), e);
            }
        }

        Ok(outcome)
    }
}

/// Recover every archived video of the account in `stats`.
///
/// Fails only when the index cannot be queried or has no snapshots for the
/// account. Failures on individual pages are logged, counted and skipped.
pub async fn recover_account(
    fetcher: Arc<dyn ArchiveFetcher>,
    config: &Config,
    stats: &mut RecoveryStats,
) -> Result<()> {
    let account = stats.account.clone();
    let show = config.options.show_downloads;

    let spinner = show.then(|| create_spinner("Querying the Wayback Machine index..."));
    let listed = SnapshotLister::new(fetcher.clone(), &config.archive)
        .list_snapshots(&account)
        .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let snapshots = listed?;
    stats.snapshots = snapshots.len() as u64;

    let pages = discover_video_pages(fetcher.as_ref(), config, &account, &snapshots, stats).await;
    stats.found = pages.len() as u64;

    if pages.is_empty() {
        tracing::warn!("No video pages found in {} snapshots", snapshots.len());
        return Ok(());
    }

    tracing::info!("Found {} video pages for {}", pages.len(), account);

    let target_dir = get_account_folder(config, &account)?;
    let cache = if config.options.use_cache {
        let cache = RecoveryCache::open(&config.cache_path())?;
        tracing::debug!(
            "Recovery cache {} lists {} pages",
            cache.path().display(),
            cache.len().await
        );
        Some(cache)
    } else {
        None
    };
    let bars = show.then(MultiProgress::new);
    let downloader = Downloader::new(
        fetcher.clone(),
        target_dir,
        config.options.existing_files,
        bars.clone(),
    );

    let worker = Worker {
        fetcher: fetcher.as_ref(),
        downloader: &downloader,
        cache: cache.as_ref(),
        wayback_base: &config.archive.wayback_base,
    };

    let progress = match &bars {
        Some(bars) => bars.add(create_item_bar(pages.len() as u64, "Recovering")),
        None => ProgressBar::hidden(),
    };

    let mut results = stream::iter(pages.iter())
        .map(|page| {
            let worker = &worker;
            async move { (page, worker.process(page).await) }
        })
        .buffer_unordered(config.options.concurrency.max(1));

    while let Some((page, result)) = results.next().await {
        match result {
            Ok(PageOutcome::Downloaded { path, bytes }) => {
                stats.record_completed(page.label(), bytes);
                if show {
                    progress.println(format!("Downloaded: {}", path.display()));
                }
                tracing::debug!("Downloaded {} ({} bytes)", path.display(), bytes);
            }
            Ok(PageOutcome::Existing(path)) => {
                stats.record_skipped();
                log_skip(config, &format!("already exists: {}", path.display()));
            }
            Ok(PageOutcome::Cached) => {
                stats.record_skipped();
                log_skip(config, &format!("already recovered: {}", page.url));
            }
            Err(e) => {
                stats.record_failed();
                tracing::warn!("Failed to recover {}: {}", page.url, e);
            }
        }
        progress.inc(1);
    }

    progress.finish_and_clear();

    Ok(())
}

fn log_skip(config: &Config, message: &str) {
    if config.options.show_skipped_downloads {
        tracing::info!("Skipped, {}", message);
    } else {
        tracing::debug!("Skipped, {}", message);
    }
}

/// Turn the account's snapshots into the list of video pages to recover.
///
/// Video pages captured directly are used as-is (latest capture wins). Profile
/// captures are fetched and their video listings harvested; captures with the
/// same content digest are fetched once.
async fn discover_video_pages(
    fetcher: &dyn ArchiveFetcher,
    config: &Config,
    account: &str,
    snapshots: &[Snapshot],
    stats: &mut RecoveryStats,
) -> Vec<VideoPage> {
    let wayback_base = &config.archive.wayback_base;
    let mut pages: Vec<VideoPage> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut seen_profiles = HashSet::new();
    let mut profiles = Vec::new();

    for snapshot in snapshots {
        match classify(&snapshot.original, account) {
            SnapshotKind::VideoPage => {
                let Some(page) = VideoPage::from_snapshot(snapshot) else {
                    continue;
                };
                match index.get(&page.url) {
                    Some(&i) if pages[i].timestamp <= page.timestamp => pages[i] = page,
                    Some(_) => {}
                    None => {
                        index.insert(page.url.clone(), pages.len());
                        pages.push(page);
                    }
                }
            }
            SnapshotKind::Profile => {
                if seen_profiles.insert(snapshot.content_key()) {
                    profiles.push(snapshot);
                }
            }
            SnapshotKind::Other => {
                tracing::debug!("Ignoring snapshot of {}", snapshot.original);
            }
        }
    }

    stats.profile_pages = profiles.len() as u64;
    tracing::debug!(
        "{} direct video pages, {} distinct profile captures",
        pages.len(),
        profiles.len()
    );

    let mut fetched = stream::iter(profiles)
        .map(|snapshot| async move { (snapshot, fetcher.fetch_text(&snapshot.archive_url).await) })
        .buffered(config.options.concurrency.max(1));

    while let Some((snapshot, result)) = fetched.next().await {
        let html = match result {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to fetch profile capture {}: {}", snapshot.archive_url, e);
                continue;
            }
        };

        if let Some(count) = listed_video_count(&html) {
            stats.observe_total(count);
        }

        let mut added = 0;
        for link in harvest_video_links(&html) {
            if index.contains_key(&link) {
                continue;
            }
            if let Some(page) = VideoPage::from_link(&link, wayback_base) {
                index.insert(page.url.clone(), pages.len());
                pages.push(page);
                added += 1;
            }
        }

        tracing::debug!(
            "Profile capture {} listed {} new video pages",
            snapshot.archive_url,
            added
        );
    }

    pages
}
