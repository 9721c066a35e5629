//! Configuration module for playstv-recovery.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Existing-file handling modes
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{ArchiveConfig, Config, OptionsConfig};
pub use modes::ExistingFileMode;
pub use validation::{parse_account, validate_account, validate_config};
