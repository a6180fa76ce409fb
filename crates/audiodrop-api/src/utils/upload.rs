//! Multipart extraction for the upload handler

use audiodrop_core::constants::UPLOAD_FIELD_NAME;
use audiodrop_core::AppError;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;

/// The single file part of an upload request.
#[derive(Debug)]
pub struct UploadedFile {
    pub data: Bytes,
    pub filename: String,
    pub content_type: String,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Extract the part named `file`. Exactly one such part is accepted; other
/// fields are ignored.
pub async fn extract_multipart_file(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }
        if file.is_some() {
            return Err(AppError::InvalidInput(format!(
                "Multiple file fields are not allowed; send exactly one field named '{}'",
                UPLOAD_FIELD_NAME
            )));
        }

        let filename = field
            .file_name()
            .map(String::from)
            .unwrap_or_else(|| "unknown".to_string());
        let content_type = field
            .content_type()
            .map(String::from)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = field.bytes().await.map_err(multipart_error)?;

        file = Some(UploadedFile {
            data,
            filename,
            content_type,
        });
    }

    file.ok_or_else(|| {
        AppError::InvalidInput(format!("No file provided in field '{}'", UPLOAD_FIELD_NAME))
    })
}
