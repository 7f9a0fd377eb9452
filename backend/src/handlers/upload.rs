//! File upload handler

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use shared::FileReference;

use crate::error::{AppError, AppResult};
use crate::external::{StorageClient, UploadedFile};
use crate::middleware::CurrentUser;
use crate::AppState;

/// Accept a single `file` field and forward it to object storage
pub async fn upload_file(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<FileReference>)> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::ValidationError(format!("Malformed upload: {}", e)))?;

        upload = Some(UploadedFile {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let file = upload.ok_or_else(|| AppError::Validation {
        field: "file".to_string(),
        message: "A file is required".to_string(),
        message_es: "Debes adjuntar un archivo".to_string(),
    })?;

    let size = file.bytes.len();
    let client = StorageClient::new(&state.config.storage);
    let reference = client.upload(file).await?;

    tracing::info!(
        user_id = %user.user_id,
        size_bytes = size,
        file_url = %reference.file_url,
        "File uploaded"
    );

    Ok((StatusCode::CREATED, Json(reference)))
}
