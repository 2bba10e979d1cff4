//! Blob storage for uploaded images.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// Attempts at finding a free name when two uploads share a millisecond.
const MAX_NAME_ATTEMPTS: u32 = 8;

/// Errors from a blob store.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("no free file name for {0}")]
    NameExhausted(String),
}

/// Stores uploaded bytes and returns their public URL.
pub trait BlobStore: Send + Sync {
    fn put(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> impl Future<Output = Result<String, BlobError>> + Send;
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

/// Writes blobs as `{timestamp_ms}-{sanitized_name}` into a local directory
/// served at `public_base_url`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    dir: PathBuf,
    public_base_url: String,
}

impl FsBlobStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn candidate(stamp: i64, attempt: u32, name: &str) -> String {
        if attempt == 0 {
            format!("{stamp}-{name}")
        } else {
            format!("{stamp}-{attempt}-{name}")
        }
    }
}

impl BlobStore for FsBlobStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, file_name: &str, bytes: &[u8]) -> Result<String, BlobError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = sanitize_file_name(file_name);
        let stamp = Utc::now().timestamp_millis();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let stored = Self::candidate(stamp, attempt, &name);
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&stored))
                .await;

            match opened {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    debug!(file = %stored, "Blob stored");
                    return Ok(format!("{}/{stored}", self.public_base_url));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
        }

        Err(BlobError::NameExhausted(name))
    }
}
