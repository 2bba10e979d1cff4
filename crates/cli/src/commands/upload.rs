//! Batch image upload through the admin API.
//!
//! Files are read from disk, downsampled when oversized and posted one by
//! one to `{admin_url}/api/admin/upload`. The resulting URLs are printed in
//! listing order, ready to paste into a product's `images`.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use teslix_admin::services::{HttpImageHost, ImageIntake, IntakeError, UploadError, UploadFile};
use teslix_core::images::ImageSelection;

/// Errors from the upload command.
#[derive(Debug, Error)]
pub enum UploadCommandError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid admin URL: {0}")]
    AdminUrl(#[from] UploadError),

    #[error(transparent)]
    Intake(#[from] IntakeError),
}

/// Content type guessed from the file extension.
fn content_type_for(path: &Path) -> &'static str {
    ImageFormat::from_path(path).map_or("application/octet-stream", |format| format.to_mime_type())
}

async fn read_upload(path: &Path) -> Result<UploadFile, UploadCommandError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| UploadCommandError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "file".to_string(), |name| name.to_string_lossy().into_owned());

    Ok(UploadFile::new(file_name, content_type_for(path), bytes))
}

/// Upload `files` for a listing that already holds `current_count` images.
///
/// # Errors
///
/// Returns an error if a file cannot be read or the batch is aborted.
pub async fn run(
    admin_url: &str,
    admin_secret: &SecretString,
    current_count: usize,
    files: &[PathBuf],
) -> Result<(), UploadCommandError> {
    let host = HttpImageHost::new(admin_url)?;

    let mut uploads = Vec::with_capacity(files.len());
    for path in files {
        uploads.push(read_upload(path).await?);
    }

    let report = ImageIntake::new(&host)
        .run(admin_secret.expose_secret(), current_count, uploads)
        .await?;

    for name in &report.rejected {
        tracing::warn!(file = %name, "Skipped: larger than the upload limit");
    }
    for name in &report.truncated {
        tracing::warn!(file = %name, "Skipped: listing image limit reached");
    }

    let mut selection = ImageSelection::new();
    selection.extend(report.urls);

    #[allow(clippy::print_stdout)]
    {
        for url in selection.urls() {
            println!("{url}");
        }
    }
    Ok(())
}
