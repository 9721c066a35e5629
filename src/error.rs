//! Error types for the playstv-recovery application.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Archive errors
    #[error("No archived snapshots found for account: {0}")]
    NotFound(String),

    #[error("No recoverable videos found for account: {0}")]
    NoVideos(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Rate limited by the archive (HTTP 429): {0}")]
    RateLimited(String),

    // Extraction errors
    #[error("Parse error: {0}")]
    Parse(String),

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    // File system errors
    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether a failed request is worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::RateLimited(_) => true,
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::Fetch(msg) => msg.starts_with("HTTP 5"),
            _ => false,
        }
    }

    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_)
            | Error::ConfigValidation { .. }
            | Error::MissingConfig(_)
            | Error::TomlParse(_) => exit_codes::CONFIG_ERROR,
            Error::NotFound(_) | Error::NoVideos(_) => exit_codes::NO_VIDEOS,
            Error::Fetch(_) | Error::RateLimited(_) | Error::Http(_) | Error::Parse(_) => {
                exit_codes::ARCHIVE_ERROR
            }
            _ => exit_codes::UNEXPECTED_ERROR,
        }
    }
}

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const UNEXPECTED_ERROR: i32 = 1;
    pub const ARCHIVE_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const NO_VIDEOS: i32 = 4;
}
