//! Configuration structures and loading logic.

use crate::config::modes::ExistingFileMode;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Account whose videos are recovered. Usually supplied on the command line.
    #[serde(default)]
    pub account: Option<String>,

    #[serde(default)]
    pub archive: ArchiveConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// Wayback Machine access configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// CDX index search endpoint.
    #[serde(default = "default_cdx_endpoint")]
    pub cdx_endpoint: String,

    /// Base URL snapshots are served from.
    #[serde(default = "default_wayback_base")]
    pub wayback_base: String,

    /// Profile path queried in the index; `{account}` is substituted.
    #[serde(default = "default_profile_path")]
    pub profile_path: String,

    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Earliest capture timestamp (`YYYYMMDDhhmmss` prefix).
    #[serde(default)]
    pub from: Option<String>,

    /// Latest capture timestamp (`YYYYMMDDhhmmss` prefix).
    #[serde(default)]
    pub to: Option<String>,

    /// Maximum number of index rows to request.
    #[serde(default)]
    pub limit: Option<u32>,

    /// Attempts per request on rate limiting or server errors.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Download options configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionsConfig {
    /// Base directory for downloads.
    #[serde(default = "default_download_directory")]
    pub download_directory: PathBuf,

    /// Number of video pages processed at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Requests per second sent to the archive.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// What to do when the target file already exists.
    #[serde(default)]
    pub existing_files: ExistingFileMode,

    /// Whether to consult and update the recovery cache.
    #[serde(default = "default_true")]
    pub use_cache: bool,

    /// Whether to show download progress.
    #[serde(default = "default_true")]
    pub show_downloads: bool,

    /// Whether to show skipped downloads.
    #[serde(default)]
    pub show_skipped_downloads: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            cdx_endpoint: default_cdx_endpoint(),
            wayback_base: default_wayback_base(),
            profile_path: default_profile_path(),
            user_agent: default_user_agent(),
            from: None,
            to: None,
            limit: None,
            max_attempts: default_max_attempts(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            download_directory: default_download_directory(),
            concurrency: default_concurrency(),
            requests_per_second: default_requests_per_second(),
            existing_files: ExistingFileMode::default(),
            use_cache: true,
            show_downloads: true,
            show_skipped_downloads: false,
        }
    }
}

fn default_cdx_endpoint() -> String {
    "https://web.archive.org/cdx/search/cdx".to_string()
}

fn default_wayback_base() -> String {
    "https://web.archive.org/web".to_string()
}

fn default_profile_path() -> String {
    "plays.tv/u/{account}".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_timeout() -> u64 {
    300
}

fn default_download_directory() -> PathBuf {
    PathBuf::from("plays-tv-videos")
}

fn default_concurrency() -> usize {
    10
}

// The archive starts refusing connections somewhere above this.
fn default_requests_per_second() -> u32 {
    14
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the account name or fail if none was given.
    pub fn account(&self) -> Result<&str> {
        self.account
            .as_deref()
            .ok_or_else(|| Error::MissingConfig("account (the plays.tv username)".to_string()))
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> &Path {
        &self.options.download_directory
    }

    /// Path of the recovery cache file.
    pub fn cache_path(&self) -> PathBuf {
        self.options.download_directory.join("cache")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.account.is_none());
        assert_eq!(config.options.concurrency, 10);
        assert_eq!(config.options.requests_per_second, 14);
        assert_eq!(config.options.existing_files, ExistingFileMode::Skip);
        assert_eq!(
            config.archive.cdx_endpoint,
            "https://web.archive.org/cdx/search/cdx"
        );
        assert_eq!(config.cache_path(), PathBuf::from("plays-tv-videos/cache"));
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
            account = "someone"

            [archive]
            from = "2018"
            limit = 500

            [options]
            concurrency = 4
            existing_files = "overwrite"
            "#,
        )
        .unwrap();

        assert_eq!(config.account().unwrap(), "someone");
        assert_eq!(config.archive.from.as_deref(), Some("2018"));
        assert_eq!(config.archive.limit, Some(500));
        assert_eq!(config.archive.max_attempts, 3);
        assert_eq!(config.options.concurrency, 4);
        assert_eq!(config.options.existing_files, ExistingFileMode::Overwrite);
        assert!(config.options.use_cache);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "account = \"roundtrip\"\n\n[options]\nrequests_per_second = 5\n")
            .unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.account.as_deref(), Some("roundtrip"));
        assert_eq!(loaded.options.requests_per_second, 5);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
