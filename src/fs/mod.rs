//! Filesystem module.
//!
//! Provides:
//! - Path and directory management
//! - Filename generation and validation

pub mod naming;
pub mod paths;

pub use naming::{sanitize_filename, sanitize_path_component, video_extension, video_filename};
pub use paths::get_account_folder;
