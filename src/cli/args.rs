//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, ExistingFileMode};

/// plays.tv video recovery CLI.
#[derive(Parser, Debug)]
#[command(
    name = "playstv-recovery",
    version,
    about = "Recover plays.tv videos from the Wayback Machine",
    long_about = "Looks up a plays.tv account in the Internet Archive's Wayback Machine, finds the \
                  archived video pages and downloads every video that can still be recovered.\n\n\
                  The account may be given as a username, @username or profile URL."
)]
pub struct Args {
    /// plays.tv account to recover.
    pub account: String,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory")]
    pub download_directory: Option<PathBuf>,

    /// Path to configuration file (optional).
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Number of video pages processed at once.
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Maximum requests per second sent to the archive.
    #[arg(long = "rate-limit")]
    pub rate_limit: Option<u32>,

    /// Browser user agent string.
    #[arg(short = 'a', long = "user-agent", env = "PLAYSTV_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Only use captures from this timestamp on (YYYYMMDDhhmmss prefix).
    #[arg(long)]
    pub from: Option<String>,

    /// Only use captures up to this timestamp (YYYYMMDDhhmmss prefix).
    #[arg(long)]
    pub to: Option<String>,

    /// Maximum number of index entries to request.
    #[arg(long)]
    pub limit: Option<u32>,

    /// Re-download and replace files that already exist.
    #[arg(long)]
    pub overwrite: bool,

    /// Ignore the recovery cache and do not update it.
    #[arg(long)]
    pub no_cache: bool,

    /// Hide download progress information.
    #[arg(long, short)]
    pub quiet: bool,

    /// Show information about skipped downloads.
    #[arg(long)]
    pub show_skipped: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        config.account = Some(self.account);

        if let Some(dir) = self.download_directory {
            config.options.download_directory = dir;
        }

        if let Some(concurrency) = self.concurrency {
            config.options.concurrency = concurrency;
        }

        if let Some(rate) = self.rate_limit {
            config.options.requests_per_second = rate;
        }

        if let Some(user_agent) = self.user_agent {
            config.archive.user_agent = user_agent;
        }

        if let Some(from) = self.from {
            config.archive.from = Some(from);
        }

        if let Some(to) = self.to {
            config.archive.to = Some(to);
        }

        if let Some(limit) = self.limit {
            config.archive.limit = Some(limit);
        }

        // Boolean flags (only override if set to non-default)
        if self.overwrite {
            config.options.existing_files = ExistingFileMode::Overwrite;
        }

        if self.no_cache {
            config.options.use_cache = false;
        }

        if self.quiet {
            config.options.show_downloads = false;
            config.options.show_skipped_downloads = false;
        }

        if self.show_skipped {
            config.options.show_skipped_downloads = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_merge() {
        let args = Args::try_parse_from([
            "playstv-recovery",
            "gamer",
            "-d",
            "/tmp/videos",
            "-j",
            "4",
            "--rate-limit",
            "5",
            "--from",
            "2019",
            "--overwrite",
            "--no-cache",
        ])
        .unwrap();

        let mut config = Config::default();
        args.merge_into_config(&mut config);

        assert_eq!(config.account.as_deref(), Some("gamer"));
        assert_eq!(config.options.download_directory, PathBuf::from("/tmp/videos"));
        assert_eq!(config.options.concurrency, 4);
        assert_eq!(config.options.requests_per_second, 5);
        assert_eq!(config.archive.from.as_deref(), Some("2019"));
        assert_eq!(config.options.existing_files, ExistingFileMode::Overwrite);
        assert!(!config.options.use_cache);
    }

    #[test]
    fn test_defaults_keep_config_values() {
        let args = Args::try_parse_from(["playstv-recovery", "gamer"]).unwrap();

        let mut config = Config::default();
        config.options.concurrency = 2;
        args.merge_into_config(&mut config);

        assert_eq!(config.options.concurrency, 2);
        assert_eq!(config.options.existing_files, ExistingFileMode::Skip);
        assert!(config.options.use_cache);
        assert!(config.options.show_downloads);
    }

    #[test]
    fn test_account_required() {
        assert!(Args::try_parse_from(["playstv-recovery"]).is_err());
    }
}
