//! File Upload Endpoints
//!
//! Any signed-in account may upload and read attachments. Deletion is open to
//! admins and to the uploader.

use crate::api::AppState;
use crate::auth::models::{Claims, UserRole};
use crate::error::{ApiError, ValidPath};
use crate::files::{models::clean_original_name, FileKind, StoredFile, MAX_UPLOAD_BYTES};
use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

pub const FILE_FIELD: &str = "file";
pub const FILE_TOO_LARGE: &str = "File size exceeds 10MB";
pub const FILE_TYPE_NOT_ALLOWED: &str = "File type not allowed";

#[derive(Debug, Serialize)]
pub struct FileList {
    pub data: Vec<StoredFile>,
    pub total: usize,
}

fn file_not_found() -> ApiError {
    ApiError::not_found("File not found")
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::invalid_payload(FILE_TOO_LARGE)
    } else {
        ApiError::invalid_payload(err.body_text())
    }
}

/// Read a field, failing as soon as it grows past the upload cap
async fn read_capped(mut field: Field<'_>) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::invalid_payload(FILE_TOO_LARGE));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// POST /api/files/upload (multipart, field `file`)
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<StoredFile>), ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::invalid_payload(e.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = clean_original_name(field.file_name().unwrap_or_default());
        let kind = field
            .content_type()
            .and_then(FileKind::from_content_type)
            .ok_or_else(|| {
                debug!(
                    "Rejected upload {} with type {:?}",
                    original_name,
                    field.content_type()
                );
                ApiError::invalid_payload(FILE_TYPE_NOT_ALLOWED)
            })?;

        let bytes = read_capped(field).await?;
        let stored = state
            .files
            .save(&original_name, kind, &bytes, &claims.sub)
            .await?;
        return Ok((StatusCode::CREATED, Json(stored)));
    }

    Err(ApiError::invalid_payload("No file uploaded"))
}

/// GET /api/files
pub async fn list_files(State(state): State<AppState>) -> Result<Json<FileList>, ApiError> {
    let data = state.files.list()?;
    Ok(Json(FileList {
        total: data.len(),
        data,
    }))
}

/// GET /api/files/:id
pub async fn get_file(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<StoredFile>, ApiError> {
    state.files.get(id)?.map(Json).ok_or_else(file_not_found)
}

/// DELETE /api/files/:id (admin or uploader)
pub async fn delete_file(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<Value>, ApiError> {
    let file = state.files.get(id)?.ok_or_else(file_not_found)?;
    match claims.role {
        UserRole::Admin => {}
        UserRole::User if file.uploaded_by == claims.sub => {}
        UserRole::User => return Err(ApiError::Forbidden),
    }

    if state.files.delete(id).await?.is_none() {
        return Err(file_not_found());
    }
    Ok(Json(json!({ "message": "File deleted successfully", "id": id })))
}
