//! Image upload endpoints.

use axum::{
    Json,
    extract::{Multipart, State, multipart::Field},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::instrument;

use teslix_core::images::{MAX_IMAGE_BYTES, MAX_IMAGES_PER_LISTING};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminKey;
use crate::services::{
    BlobImageHost, BlobStore, ImageIntake, IntakeReport, UploadError, UploadFile,
};
use crate::state::AppState;

/// Multipart overhead allowed on top of the file bytes.
const MULTIPART_SLACK: usize = 64 * 1024;

/// Body limit of the single-file endpoint. Twice the file ceiling, so an
/// oversized file reaches the handler and gets a JSON error.
#[allow(clippy::cast_possible_truncation)]
pub const SINGLE_BODY_LIMIT: usize = 2 * MAX_IMAGE_BYTES as usize + MULTIPART_SLACK;

/// Body limit of the batch endpoint. Oversized files still have to reach the
/// handler so they can be reported as rejected.
pub const BATCH_BODY_LIMIT: usize = MAX_IMAGES_PER_LISTING * SINGLE_BODY_LIMIT;

fn multipart_error(err: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {err}"))
}

async fn read_file(field: Field<'_>) -> Result<UploadFile> {
    let file_name = field.file_name().unwrap_or("file").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await.map_err(multipart_error)?;

    Ok(UploadFile::new(file_name, content_type, bytes.to_vec()))
}

/// Store the multipart `file` field and return its public URL.
#[instrument(skip_all)]
pub async fn single(
    RequireAdminKey(_): RequireAdminKey,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>)> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            file = Some(read_file(field).await?);
            break;
        }
    }
    let file = file.ok_or_else(|| AppError::BadRequest("No file".to_string()))?;
    if file.size() > MAX_IMAGE_BYTES {
        return Err(AppError::BadRequest(format!(
            "File exceeds {} MiB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    let url = state
        .blobs()
        .put(&file.file_name, &file.bytes)
        .await
        .map_err(UploadError::from)?;
    tracing::info!(url = %url, size = file.size(), "Image stored");

    Ok((StatusCode::CREATED, Json(json!({ "url": url }))))
}

/// Run the intake pipeline over every `file` field.
///
/// An optional `current_count` field gives the number of images the listing
/// already holds.
#[instrument(skip_all)]
pub async fn batch(
    RequireAdminKey(credential): RequireAdminKey,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<IntakeReport>)> {
    let mut files = Vec::new();
    let mut current_count = 0;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => files.push(read_file(field).await?),
            Some("current_count") => {
                let text = field.text().await.map_err(multipart_error)?;
                current_count = text.trim().parse().map_err(|_| {
                    AppError::BadRequest("current_count must be a non-negative integer".to_string())
                })?;
            }
            _ => {}
        }
    }
    if files.is_empty() {
        return Err(AppError::BadRequest("No file".to_string()));
    }

    let host = BlobImageHost::new(state.verifier(), state.blobs());
    let report = ImageIntake::new(&host)
        .run(&credential, current_count, files)
        .await?;

    Ok((StatusCode::CREATED, Json(report)))
}
