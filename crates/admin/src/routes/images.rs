//! Listing of reusable part images.

use std::io::ErrorKind;
use std::path::Path;

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use crate::state::AppState;

#[derive(Debug, Default, Serialize)]
pub struct ImageFiles {
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// File names in `dir`, hidden files excluded, sorted. A missing directory
/// yields an empty list.
///
/// # Errors
///
/// Returns the I/O error if the directory exists but cannot be read.
pub async fn list_image_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}

/// List the parts directory.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> (StatusCode, Json<ImageFiles>) {
    match list_image_files(&state.config().parts_dir).await {
        Ok(files) => (StatusCode::OK, Json(ImageFiles { files, error: None })),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read parts directory");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ImageFiles {
                    files: Vec::new(),
                    error: Some("Failed to read images".to_string()),
                }),
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_visible_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("a.png"), b"x").unwrap();
        std::fs::write(dir.path().join(".DS_Store"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("thumbs")).unwrap();

        let files = list_image_files(dir.path()).await.unwrap();
        assert_eq!(files, vec!["a.png", "b.jpg"]);
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let files = list_image_files(&dir.path().join("nope")).await.unwrap();
        assert!(files.is_empty());
    }
}
