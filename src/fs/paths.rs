//! Path and directory management.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::fs::naming::sanitize_path_component;

/// Get the folder an account's videos are saved to.
///
/// Returns an error if the account name contains path traversal patterns.
pub fn get_account_folder(config: &Config, account: &str) -> Result<PathBuf> {
    let folder = sanitize_path_component(account)?;
    Ok(config.download_directory().join(folder))
}
