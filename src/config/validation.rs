//! Configuration validation logic.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Maximum account name length accepted by plays.tv.
const MAX_ACCOUNT_LENGTH: usize = 40;

static ACCOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap());

static PROFILE_URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"plays\.tv/u/([^/?#]+)").unwrap());

static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4,14}$").unwrap());

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_account(config.account()?)?;
    validate_endpoint("cdx_endpoint", &config.archive.cdx_endpoint)?;
    validate_endpoint("wayback_base", &config.archive.wayback_base)?;

    if !config.archive.profile_path.contains("{account}") {
        return Err(Error::ConfigValidation {
            field: "profile_path".to_string(),
            message: "Profile path must contain the {account} placeholder".to_string(),
        });
    }

    if config.archive.user_agent.trim().is_empty() {
        return Err(Error::MissingConfig("user_agent".to_string()));
    }

    if let Some(from) = &config.archive.from {
        validate_timestamp_bound("from", from)?;
    }
    if let Some(to) = &config.archive.to {
        validate_timestamp_bound("to", to)?;
    }

    if config.archive.max_attempts == 0 {
        return Err(Error::ConfigValidation {
            field: "max_attempts".to_string(),
            message: "At least one attempt is required".to_string(),
        });
    }

    if config.options.concurrency == 0 {
        return Err(Error::ConfigValidation {
            field: "concurrency".to_string(),
            message: "Concurrency must be at least 1".to_string(),
        });
    }

    if config.options.requests_per_second == 0 {
        return Err(Error::ConfigValidation {
            field: "requests_per_second".to_string(),
            message: "Rate limit must be at least 1 request per second".to_string(),
        });
    }

    Ok(())
}

/// Validate an account name.
pub fn validate_account(account: &str) -> Result<()> {
    if account.is_empty() {
        return Err(Error::MissingConfig("account".to_string()));
    }

    if account.len() > MAX_ACCOUNT_LENGTH {
        return Err(Error::ConfigValidation {
            field: "account".to_string(),
            message: format!(
                "Account '{}' is too long (maximum {} characters)",
                account, MAX_ACCOUNT_LENGTH
            ),
        });
    }

    if !ACCOUNT_PATTERN.is_match(account) || account.chars().all(|c| c == '.') {
        return Err(Error::ConfigValidation {
            field: "account".to_string(),
            message: format!(
                "Account '{}' contains invalid characters. Only alphanumeric, '.', '-' and '_' allowed.",
                account
            ),
        });
    }

    Ok(())
}

/// Normalize user input into an account name.
///
/// Accepts a bare name, a name with a leading `@`, or a plays.tv profile URL
/// (optionally wrapped in a Wayback URL).
pub fn parse_account(input: &str) -> Result<String> {
    let input = input.trim();

    if input.contains("plays.tv/") {
        return PROFILE_URL_PATTERN
            .captures(input)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| Error::ConfigValidation {
                field: "account".to_string(),
                message: format!("Could not extract account from URL: {}", input),
            });
    }

    Ok(input.trim_start_matches('@').to_string())
}

/// Validate a CDX timestamp bound (a 4 to 14 digit prefix of `YYYYMMDDhhmmss`).
pub fn validate_timestamp_bound(field: &str, value: &str) -> Result<()> {
    if TIMESTAMP_PATTERN.is_match(value) {
        return Ok(());
    }

    Err(Error::ConfigValidation {
        field: field.to_string(),
        message: format!(
            "Invalid timestamp '{}'. Expected 4-14 digits of YYYYMMDDhhmmss.",
            value
        ),
    })
}

fn validate_endpoint(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| Error::ConfigValidation {
        field: field.to_string(),
        message: format!("Invalid URL '{}': {}", value, e),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::ConfigValidation {
            field: field.to_string(),
            message: format!("Unsupported scheme '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(account: &str) -> Config {
        Config {
            account: Some(account.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_account() {
        assert!(validate_account("valid_user123").is_ok());
        assert!(validate_account("user-name").is_ok());
        assert!(validate_account("user.name").is_ok());
        assert!(validate_account("a").is_ok());
    }

    #[test]
    fn test_invalid_account() {
        assert!(validate_account("").is_err());
        assert!(validate_account("has space").is_err());
        assert!(validate_account("slash/name").is_err());
        assert!(validate_account("..").is_err());
        assert!(validate_account(&"x".repeat(41)).is_err());
    }

    #[test]
    fn test_parse_account() {
        assert_eq!(parse_account("  @gamer  ").unwrap(), "gamer");
        assert_eq!(parse_account("https://plays.tv/u/gamer").unwrap(), "gamer");
        assert_eq!(
            parse_account("https://web.archive.org/web/2019/https://plays.tv/u/gamer?x=1").unwrap(),
            "gamer"
        );
        assert!(parse_account("https://plays.tv/video/abc").is_err());
    }

    #[test]
    fn test_timestamp_bounds() {
        assert!(validate_timestamp_bound("from", "2019").is_ok());
        assert!(validate_timestamp_bound("from", "20191210043532").is_ok());
        assert!(validate_timestamp_bound("from", "19").is_err());
        assert!(validate_timestamp_bound("from", "2019-12-10").is_err());
    }

    #[test]
    fn test_validate_config() {
        assert!(validate_config(&config_for("gamer")).is_ok());
        assert!(matches!(
            validate_config(&Config::default()),
            Err(Error::MissingConfig(_))
        ));

        let mut config = config_for("gamer");
        config.options.concurrency = 0;
        assert!(validate_config(&config).is_err());

        let mut config = config_for("gamer");
        config.archive.cdx_endpoint = "ftp://web.archive.org/cdx".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = config_for("gamer");
        config.archive.profile_path = "plays.tv/u/".to_string();
        assert!(validate_config(&config).is_err());
    }
}
