//! Download module for video recovery.
//!
//! This module provides:
//! - Recovery statistics tracking
//! - Video file downloading
//! - The account recovery pipeline

pub mod pipeline;
pub mod state;
pub mod video;

pub use pipeline::recover_account;
pub use state::{RecoveryEvent, RecoveryStats};
pub use video::{DownloadOutcome, Downloader};
