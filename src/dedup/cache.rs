//! Persistent record of recovered video pages.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::Result;

const HEADER: &str = "# This is a cache file for playstv-recovery. Video pages on this list will not be re-downloaded.\n\
# Freely delete this file or remove entries to re-download videos.\n";

/// Video page URLs that have already been recovered, one per line on disk.
///
/// Lines starting with `#` are comments. Safe to share between workers.
pub struct RecoveryCache {
    path: PathBuf,
    urls: Mutex<HashSet<String>>,
}

impl RecoveryCache {
    /// Open the cache file, creating it (and its directory) if missing.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let urls = if path.exists() {
            load_urls(&std::fs::read_to_string(path)?)
        } else {
            std::fs::write(path, HEADER)?;
            HashSet::new()
        };

        tracing::debug!("Loaded {} cached entries from {}", urls.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            urls: Mutex::new(urls),
        })
    }

    /// Path of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a page has already been recovered.
    pub async fn contains(&self, url: &str) -> bool {
        self.urls.lock().await.contains(url)
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.urls.lock().await.len()
    }

    /// Record a recovered page. Returns `false` if it was already cached.
    pub async fn add(&self, url: &str) -> Result<bool> {
        let mut urls = self.urls.lock().await;
        if urls.contains(url) {
            return Ok(false);
        }

        let mut file = OpenOptions::new().append(true).open(&self.path).await?;
        file.write_all(format!("{}\n", url).as_bytes()).await?;
        file.flush().await?;

        urls.insert(url.to_string());
        Ok(true)
    }
}

fn load_urls(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
