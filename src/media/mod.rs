//! Media module for video page representation and HTML parsing.

pub mod item;
pub mod parser;

pub use item::{VideoPage, VideoRecord};
pub use parser::{build_record, extract_video_url, harvest_video_links, listed_video_count};
