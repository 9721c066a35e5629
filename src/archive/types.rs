//! CDX index response types.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use crate::archive::urls::{raw_snapshot_url, snapshot_url};
use crate::error::{Error, Result};

/// Format of archive capture timestamps.
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// An archived capture of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// URL as originally served.
    pub original: String,

    /// Capture timestamp (`YYYYMMDDhhmmss`).
    pub timestamp: String,

    /// URL the capture is served from by the archive.
    pub archive_url: String,

    /// Raw-content URL of the capture.
    pub raw_url: String,

    pub mimetype: Option<String>,
    pub status: Option<String>,

    /// Content digest reported by the index. Equal digests mean equal bodies.
    pub digest: Option<String>,
}

impl Snapshot {
    /// Create a snapshot served from `wayback_base`.
    pub fn new(wayback_base: &str, original: &str, timestamp: &str) -> Self {
        Self {
            original: original.to_string(),
            timestamp: timestamp.to_string(),
            archive_url: snapshot_url(wayback_base, timestamp, original),
            raw_url: raw_snapshot_url(wayback_base, timestamp, original),
            mimetype: None,
            status: None,
            digest: None,
        }
    }

    /// Capture time, if the timestamp is well formed.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT)
            .ok()
            .map(|dt| dt.and_utc())
    }

    /// Key under which identical captures collapse.
    pub fn content_key(&self) -> String {
        match &self.digest {
            Some(digest) => format!("{}#{}", self.original, digest),
            None => format!("{}@{}", self.original, self.timestamp),
        }
    }
}

/// Column positions in a CDX JSON table.
struct Columns {
    timestamp: usize,
    original: usize,
    mimetype: Option<usize>,
    status: Option<usize>,
    digest: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self> {
        let find = |name: &str| header.iter().position(|h| h == name);

        Ok(Self {
            timestamp: find("timestamp")
                .ok_or_else(|| Error::Parse("CDX header has no 'timestamp' column".into()))?,
            original: find("original")
                .ok_or_else(|| Error::Parse("CDX header has no 'original' column".into()))?,
            mimetype: find("mimetype"),
            status: find("statuscode"),
            digest: find("digest"),
        })
    }
}

/// Parse a CDX `output=json` response into snapshots.
///
/// The first row names the columns. An empty body or a header-only table
/// yields no snapshots. Rows repeating an earlier (original, timestamp) pair
/// are dropped.
pub fn parse_cdx_json(body: &str, wayback_base: &str) -> Result<Vec<Snapshot>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<Vec<String>> = serde_json::from_str(body).map_err(|e| {
        Error::Parse(format!(
            "Failed to parse CDX response: {} - Response: {}",
            e,
            body.chars().take(200).collect::<String>()
        ))
    })?;

    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let columns = Columns::from_header(&header)?;

    let mut seen = HashSet::new();
    let mut snapshots = Vec::new();

    for row in rows {
        let (Some(timestamp), Some(original)) =
            (row.get(columns.timestamp), row.get(columns.original))
        else {
            tracing::debug!("Skipping short CDX row: {:?}", row);
            continue;
        };

        if timestamp.len() != 14
            || !timestamp.bytes().all(|b| b.is_ascii_digit())
            || NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_err()
        {
            tracing::debug!("Skipping CDX row with bad timestamp: {:?}", row);
            continue;
        }

        if !seen.insert((original.clone(), timestamp.clone())) {
            continue;
        }

        let column = |idx: Option<usize>| idx.and_then(|i| row.get(i)).cloned();

        let mut snapshot = Snapshot::new(wayback_base, original, timestamp);
        snapshot.mimetype = column(columns.mimetype);
        snapshot.status = column(columns.status);
        snapshot.digest = column(columns.digest);
        snapshots.push(snapshot);
    }

    Ok(snapshots)
}
