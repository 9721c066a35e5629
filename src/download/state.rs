//! Recovery statistics tracking.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

/// Number of recent downloads kept for display.
const RECENT_EVENTS: usize = 5;

/// A completed download, kept for the recent downloads feed.
#[derive(Debug, Clone)]
pub struct RecoveryEvent {
    pub message: String,
    pub at: DateTime<Local>,
}

impl RecoveryEvent {
    /// Completion time formatted for display.
    pub fn time(&self) -> String {
        self.at.format("%H:%M:%S").to_string()
    }
}

/// Per-account recovery state.
#[derive(Debug, Default)]
pub struct RecoveryStats {
    pub account: String,

    /// Video count listed on the archived profile, when known.
    pub total: Option<u64>,

    // Snapshot discovery
    pub snapshots: u64,
    pub profile_pages: u64,

    // Per-video outcomes
    pub found: u64,
    pub completed: u64,
    pub skipped: u64,
    pub failed: u64,

    pub bytes_downloaded: u64,

    recent: VecDeque<RecoveryEvent>,
}

impl RecoveryStats {
    /// Create empty statistics for an account.
    pub fn new(account: &str) -> Self {
        Self {
            account: account.to_string(),
            ..Default::default()
        }
    }

    /// Record the listed video count, keeping the largest seen.
    pub fn observe_total(&mut self, total: u64) {
        self.total = Some(self.total.map_or(total, |t| t.max(total)));
    }

    /// Record a completed download.
    pub fn record_completed(&mut self, name: &str, bytes: u64) {
        self.completed += 1;
        self.bytes_downloaded += bytes;

        self.recent.push_front(RecoveryEvent {
            message: name.to_string(),
            at: Local::now(),
        });
        self.recent.truncate(RECENT_EVENTS);
    }

    /// Record a video that did not need downloading.
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Record a video that could not be recovered.
    pub fn record_failed(&mut self) {
        self.failed += 1;
    }

    /// Most recent downloads, newest first.
    pub fn recent(&self) -> impl Iterator<Item = &RecoveryEvent> {
        self.recent.iter()
    }

    /// Videos present locally after the run.
    pub fn recovered(&self) -> u64 {
        self.completed + self.skipped
    }

    /// Share of found videos downloaded in this run, as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.found == 0 {
            0.0
        } else {
            self.completed as f64 / self.found as f64 * 100.0
        }
    }

    /// Videos the profile listed but discovery did not find.
    pub fn missing(&self) -> u64 {
        self.total.map_or(0, |t| t.saturating_sub(self.found))
    }
}
