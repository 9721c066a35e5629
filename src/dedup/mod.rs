//! Deduplication module.
//!
//! Keeps a persistent record of recovered pages so repeated runs only fetch
//! what is still missing.

pub mod cache;

pub use cache::RecoveryCache;
