//! Snapshot listing through the CDX index.

use std::sync::Arc;

use url::Url;

use crate::archive::fetcher::ArchiveFetcher;
use crate::archive::types::{parse_cdx_json, Snapshot};
use crate::archive::urls::is_under_profile;
use crate::config::ArchiveConfig;
use crate::error::{Error, Result};

/// Lists the archived captures under an account's profile path.
pub struct SnapshotLister {
    fetcher: Arc<dyn ArchiveFetcher>,
    archive: ArchiveConfig,
}

impl SnapshotLister {
    pub fn new(fetcher: Arc<dyn ArchiveFetcher>, archive: &ArchiveConfig) -> Self {
        Self {
            fetcher,
            archive: archive.clone(),
        }
    }

    /// Profile path queried for an account.
    pub fn profile_path(&self, account: &str) -> String {
        self.archive.profile_path.replace("{account}", account)
    }

    /// Build the CDX query URL for an account.
    pub fn query_url(&self, account: &str) -> Result<String> {
        let mut url = Url::parse(&self.archive.cdx_endpoint)?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("url", &self.profile_path(account))
                .append_pair("matchType", "prefix")
                .append_pair("output", "json")
                .append_pair("filter", "statuscode:200");

            if let Some(from) = &self.archive.from {
                query.append_pair("from", from);
            }
            if let Some(to) = &self.archive.to {
                query.append_pair("to", to);
            }
            if let Some(limit) = self.archive.limit {
                query.append_pair("limit", &limit.to_string());
            }
        }

        Ok(url.to_string())
    }

    /// List every capture under the account's profile path.
    ///
    /// Fails with [`Error::NotFound`] when the index has nothing for the account.
    pub async fn list_snapshots(&self, account: &str) -> Result<Vec<Snapshot>> {
        let query_url = self.query_url(account)?;
        tracing::debug!("Querying CDX index: {}", query_url);

        let body = self.fetcher.fetch_text(&query_url).await?;
        let profile_path = self.profile_path(account);

        let snapshots: Vec<Snapshot> = parse_cdx_json(&body, &self.archive.wayback_base)?
            .into_iter()
            .filter(|s| is_under_profile(&s.original, &profile_path))
            .collect();

        if snapshots.is_empty() {
            return Err(Error::NotFound(account.to_string()));
        }

        tracing::info!(
            "Found {} archived snapshots under {}",
            snapshots.len(),
            profile_path
        );

        let captured = snapshots.iter().filter_map(Snapshot::captured_at);
        if let (Some(first), Some(last)) = (captured.clone().min(), captured.max()) {
            tracing::debug!(
                "Captures span {} to {}",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            );
        }

        Ok(snapshots)
    }
}
