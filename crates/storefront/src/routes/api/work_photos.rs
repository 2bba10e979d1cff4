//! "Our work" photo listing.

use std::path::Path;

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::state::AppState;

/// Photos are numbered `1..=MAX_WORK_PHOTOS`.
const MAX_WORK_PHOTOS: u32 = 16;

/// Extensions tried per number, in order.
const EXTENSIONS: &[&str] = &["png", "jpg", "JPG"];

/// Response body for `GET /api/work-photos`.
#[derive(Debug, Serialize)]
pub struct WorkPhotos {
    pub photos: Vec<String>,
}

/// List the work photos present on disk as `/work/{file}` URLs.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<WorkPhotos> {
    let photos = find_photos(&state.config().work_dir)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to list work photos");
            Vec::new()
        });
    Json(WorkPhotos { photos })
}

/// For each number, the first existing `{n}.{ext}` in `dir`.
async fn find_photos(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut photos = Vec::new();
    for n in 1..=MAX_WORK_PHOTOS {
        for ext in EXTENSIONS {
            let name = format!("{n}.{ext}");
            if tokio::fs::try_exists(dir.join(&name)).await? {
                photos.push(format!("/work/{name}"));
                break;
            }
        }
    }
    Ok(photos)
}
