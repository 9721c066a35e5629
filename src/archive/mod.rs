//! Wayback Machine access.
//!
//! This module provides:
//! - HTTP client with rate limiting and retries
//! - The fetcher abstraction the pipeline is written against
//! - CDX index listing and response types
//! - Archive URL construction

pub mod client;
pub mod fetcher;
pub mod lister;
pub mod types;
pub mod urls;

pub use client::WaybackClient;
pub use fetcher::{ArchiveFetcher, ByteStream, StreamedBody};
pub use lister::SnapshotLister;
pub use types::Snapshot;
pub use urls::SnapshotKind;
