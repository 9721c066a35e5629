//! PlaysTV Recovery - recover plays.tv videos from the Wayback Machine.
//!
//! This library looks up an account's archived profile in the Internet
//! Archive's CDX index, finds the archived video pages and downloads the
//! video files they embed.
//!
//! # Features
//!
//! - CDX index listing of every capture under the account's profile
//! - Video page discovery from direct captures and archived profile listings
//! - 720p source extraction with fallbacks
//! - Concurrent, rate-limited downloads with retries
//! - Persistent recovery cache so reruns only fetch what is missing
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use playstv_recovery::{recover_account, Config, RecoveryStats, WaybackClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let client = WaybackClient::new(&config.archive, config.options.requests_per_second)?;
//!
//!     let mut stats = RecoveryStats::new("someone");
//!     recover_account(Arc::new(client), &config, &mut stats).await?;
//!     println!("{} videos recovered", stats.recovered());
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;

// Re-exports for convenience
pub use archive::{ArchiveFetcher, Snapshot, SnapshotLister, WaybackClient};
pub use config::{Config, ExistingFileMode};
pub use dedup::RecoveryCache;
pub use download::{recover_account, Downloader, RecoveryStats};
pub use error::{Error, Result};
pub use media::{VideoPage, VideoRecord};
