//! Existing-file handling modes.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// What the downloader does when the target file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingFileMode {
    /// Leave the file alone and do not re-fetch (default).
    #[default]
    Skip,
    /// Download again and replace the file.
    Overwrite,
}

impl fmt::Display for ExistingFileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExistingFileMode::Skip => write!(f, "skip"),
            ExistingFileMode::Overwrite => write!(f, "overwrite"),
        }
    }
}

impl FromStr for ExistingFileMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(ExistingFileMode::Skip),
            "overwrite" => Ok(ExistingFileMode::Overwrite),
            _ => Err(format!("Unknown existing-file mode: {}", s)),
        }
    }
}
