use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;
use audiodrop_core::validation::{
    sanitize_filename, validate_content_type, validate_extension_content_type_match,
    validate_file_extension, validate_file_size,
};
use audiodrop_core::{AppError, StoredObject};
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::Json;
use std::sync::Arc;

/// `POST /upload`: validate the `file` part and write it to the bucket.
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_audio"))]
pub async fn upload_audio(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<StoredObject>, HttpAppError> {
    let multipart = multipart.map_err(|e| {
        AppError::InvalidInput(format!("Invalid multipart request: {}", e.body_text()))
    })?;
    let file = extract_multipart_file(multipart).await?;

    tracing::debug!(
        filename = %file.filename,
        content_type = %file.content_type,
        size_bytes = file.data.len(),
        "Received upload"
    );

    let config = &state.config;
    validate_file_size(file.data.len(), config.max_audio_size_bytes())?;
    validate_content_type(&file.content_type, config.audio_allowed_content_types())?;
    validate_file_extension(&file.filename, config.audio_allowed_extensions())?;
    validate_extension_content_type_match(&file.filename, &file.content_type)?;
    let safe_filename = sanitize_filename(&file.filename)?;

    let object = state
        .storage
        .upload(&safe_filename, &file.content_type, file.data)
        .await?;

    tracing::info!(
        bucket = %object.bucket,
        key = %object.key,
        size_bytes = object.size_bytes,
        "Audio uploaded"
    );

    Ok(Json(object))
}
