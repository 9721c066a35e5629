//! Filename generation and validation.

use crate::error::{Error, Result};
use crate::media::VideoPage;

/// Extension used when the video URL does not reveal one.
const DEFAULT_EXTENSION: &str = "mp4";

/// Validate and sanitize a filename by removing or replacing invalid characters.
///
/// Returns an error if the filename contains path separators or names a
/// directory (`.` or `..`).
pub fn sanitize_filename(name: &str) -> Result<String> {
    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name == "." || name == ".." {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Sanitize a path component (folder name), replacing separators instead of rejecting them.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    if name.split(['/', '\\']).any(|part| part == "..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() || sanitized.chars().all(|c| c == '.') {
        return Err(Error::InvalidFilename(
            "Path component cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// File extension for a video URL.
///
/// Uses the URL's extension when it names a video type, `mp4` otherwise.
pub fn video_extension(video_url: &str) -> String {
    let path = video_url.split(['?', '#']).next().unwrap_or("");
    let last = path.rsplit('/').next().unwrap_or("");

    let is_video = mime_guess::from_path(last)
        .first()
        .map(|mime| mime.type_() == mime_guess::mime::VIDEO)
        .unwrap_or(false);

    match last.rsplit_once('.') {
        Some((_, ext)) if is_video => ext.to_lowercase(),
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

/// Extension for a response Content-Type, if it is a video type.
///
/// `current` is kept when the type lists it among its extensions, so a
/// `video/mp4` response leaves `mp4` alone.
pub fn extension_for_content_type(content_type: &str, current: &str) -> Option<String> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    if !essence.starts_with("video/") {
        return None;
    }

    let extensions = mime_guess::get_mime_extensions_str(&essence)?;
    if extensions.iter().any(|ext| ext.eq_ignore_ascii_case(current)) {
        return Some(current.to_string());
    }
    extensions.first().map(|ext| ext.to_string())
}

/// Deterministic local filename for a video page: `{slug}_{id}.{ext}`.
pub fn video_filename(page: &VideoPage, video_url: &str) -> Result<String> {
    let stem = match &page.slug {
        Some(slug) => format!("{}_{}", slug, page.id),
        None => page.id.clone(),
    };

    sanitize_filename(&format!("{}.{}", stem, video_extension(video_url)))
}
