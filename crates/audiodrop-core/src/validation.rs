//! Validation of uploaded audio files
//!
//! Used by the ingestion endpoint before anything is written to storage, and
//! by the client to derive a MIME hint from a file extension.

use std::path::Path;

use crate::error::AppError;

const MAX_FILENAME_LENGTH: usize = 255;

/// MIME types accepted for an audio extension. The first entry is the canonical one.
pub fn audio_content_types_for_extension(extension: &str) -> Option<&'static [&'static str]> {
    let types: &'static [&'static str] = match extension.to_lowercase().as_str() {
        "mp3" => &["audio/mpeg", "audio/mp3"],
        "wav" => &["audio/wav", "audio/wave", "audio/x-wav"],
        "ogg" | "oga" => &["audio/ogg", "application/ogg"],
        "m4a" => &["audio/mp4", "audio/x-m4a"],
        "flac" => &["audio/flac", "audio/x-flac"],
        "aac" => &["audio/aac"],
        _ => return None,
    };
    Some(types)
}

/// Canonical MIME type for a filename, falling back to `application/octet-stream`.
pub fn mime_hint_for_filename(filename: &str) -> &'static str {
    file_extension(filename)
        .and_then(|ext| audio_content_types_for_extension(&ext))
        .and_then(|types| types.first().copied())
        .unwrap_or("application/octet-stream")
}

/// Lowercased extension of a filename, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
}

/// Normalize MIME type by stripping parameters (e.g. "audio/mpeg; rate=44100" -> "audio/mpeg").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size == 0 {
        return Err(AppError::InvalidInput("File is empty".to_string()));
    }
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Validate content type against allowlist. Compares normalized MIME type only.
pub fn validate_content_type(content_type: &str, allowed_types: &[String]) -> Result<(), AppError> {
    let normalized = normalize_mime_type(content_type).to_lowercase();
    if !allowed_types.iter().any(|ct| normalized == ct.to_lowercase()) {
        return Err(AppError::InvalidInput(format!(
            "Invalid content type. Allowed types: {}",
            allowed_types.join(", ")
        )));
    }
    Ok(())
}

/// Validate file extension, returning it lowercased.
pub fn validate_file_extension(
    filename: &str,
    allowed_extensions: &[String],
) -> Result<String, AppError> {
    let extension = file_extension(filename).unwrap_or_default();

    if !allowed_extensions.contains(&extension) {
        return Err(AppError::InvalidInput(format!(
            "Invalid file extension. Allowed extensions: {}",
            allowed_extensions.join(", ")
        )));
    }

    Ok(extension)
}

/// Reject uploads whose declared Content-Type disagrees with their extension.
pub fn validate_extension_content_type_match(
    filename: &str,
    content_type: &str,
) -> Result<(), AppError> {
    let extension = file_extension(filename)
        .ok_or_else(|| AppError::InvalidInput("File must have an extension".to_string()))?;

    let Some(expected) = audio_content_types_for_extension(&extension) else {
        tracing::debug!(
            extension = %extension,
            content_type = %content_type,
            "Unknown extension, skipping Content-Type/extension cross-validation"
        );
        return Ok(());
    };

    let normalized = normalize_mime_type(content_type).to_lowercase();
    if !expected.iter().any(|ct| normalized == *ct) {
        return Err(AppError::InvalidInput(format!(
            "Content-Type '{}' does not match extension '{}'. Expected one of: {}",
            content_type,
            extension,
            expected.join(", ")
        )));
    }
    Ok(())
}

/// Sanitize a client-supplied filename for use inside an object key.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    // `file_name()` is None for names ending in `..`; anything left is a single segment
    let filename_only = match Path::new(filename).file_name().and_then(|n| n.to_str()) {
        Some(name) if name != ".." => name,
        _ => {
            return Err(AppError::InvalidInput(
                "Filename contains invalid path traversal".to_string(),
            ))
        }
    };

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches('_').is_empty() || sanitized.len() < 3 {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}
