//! Image intake pipeline.
//!
//! A batch is planned against the listing cap and size ceiling, then each
//! accepted file is prepared and uploaded in arrival order. The first failed
//! upload aborts the batch and the URLs collected so far are discarded.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use teslix_core::images::{MAX_IMAGES_PER_LISTING, plan_batch};

use super::auth::CredentialVerifier;
use super::blob::{BlobError, BlobStore};
use super::images::{UploadFile, prepare_for_upload};

/// Header carrying the admin credential.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Errors from a single upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("storage failed: {0}")]
    Storage(#[from] BlobError),

    #[error("request failed: {0}")]
    Request(String),

    #[error("upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid response: {0}")]
    Response(String),

    #[error("image processing failed: {0}")]
    Processing(String),
}

/// Errors that abort a batch.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The host refused the credential. Nothing further is attempted.
    #[error("unauthorized")]
    Unauthorized,

    #[error("listing already has the maximum of {MAX_IMAGES_PER_LISTING} images")]
    CapReached,

    #[error("upload of {file} failed: {source}")]
    Upload {
        file: String,
        #[source]
        source: UploadError,
    },
}

/// Stores one prepared file and returns its public URL.
pub trait ImageHost: Send + Sync {
    fn upload(
        &self,
        credential: &str,
        file: UploadFile,
    ) -> impl Future<Output = Result<String, UploadError>> + Send;
}

/// Outcome of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeReport {
    /// Hosted URLs in arrival order.
    pub urls: Vec<String>,
    /// Files skipped for exceeding the size ceiling.
    pub rejected: Vec<String>,
    /// Files dropped because the listing cap was reached.
    pub truncated: Vec<String>,
}

/// Runs batches against an [`ImageHost`].
pub struct ImageIntake<'a, H> {
    host: &'a H,
}

impl<'a, H: ImageHost> ImageIntake<'a, H> {
    pub const fn new(host: &'a H) -> Self {
        Self { host }
    }

    /// Plan, prepare and upload `files` for a listing that already holds
    /// `current_count` images.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::CapReached` when the listing is full,
    /// `IntakeError::Unauthorized` when the host rejects the credential and
    /// `IntakeError::Upload` for any other failed upload.
    #[instrument(skip(self, credential, files), fields(files = files.len()))]
    pub async fn run(
        &self,
        credential: &str,
        current_count: usize,
        files: Vec<UploadFile>,
    ) -> Result<IntakeReport, IntakeError> {
        let sizes: Vec<u64> = files.iter().map(UploadFile::size).collect();
        let plan = plan_batch(current_count, &sizes);
        if plan.cap_reached {
            return Err(IntakeError::CapReached);
        }

        let names = |indices: &[usize]| -> Vec<String> {
            indices
                .iter()
                .filter_map(|&i| files.get(i).map(|f| f.file_name.clone()))
                .collect()
        };
        let rejected = names(&plan.rejected_oversize);
        let truncated = names(&plan.truncated);
        for file in &rejected {
            warn!(file = %file, "Skipping image over the size limit");
        }

        let mut slots: Vec<Option<UploadFile>> = files.into_iter().map(Some).collect();
        let mut urls = Vec::with_capacity(plan.accepted.len());

        for index in plan.accepted {
            let Some(file) = slots.get_mut(index).and_then(Option::take) else {
                continue;
            };
            let file_name = file.file_name.clone();

            let prepared = tokio::task::spawn_blocking(move || prepare_for_upload(file))
                .await
                .map_err(|e| IntakeError::Upload {
                    file: file_name.clone(),
                    source: UploadError::Processing(e.to_string()),
                })?;

            let url = self
                .host
                .upload(credential, prepared)
                .await
                .map_err(|source| match source {
                    UploadError::Unauthorized => IntakeError::Unauthorized,
                    source => IntakeError::Upload {
                        file: file_name,
                        source,
                    },
                })?;
            urls.push(url);
        }

        info!(
            uploaded = urls.len(),
            rejected = rejected.len(),
            truncated = truncated.len(),
            "Image batch uploaded"
        );

        Ok(IntakeReport {
            urls,
            rejected,
            truncated,
        })
    }
}

// =============================================================================
// Hosts
// =============================================================================

/// Server-side host: checks the credential, then writes to a [`BlobStore`].
pub struct BlobImageHost<'a, V: ?Sized, B> {
    verifier: &'a V,
    store: &'a B,
}

impl<'a, V: CredentialVerifier + ?Sized, B: BlobStore> BlobImageHost<'a, V, B> {
    pub const fn new(verifier: &'a V, store: &'a B) -> Self {
        Self { verifier, store }
    }
}

impl<V: CredentialVerifier + ?Sized, B: BlobStore> ImageHost for BlobImageHost<'_, V, B> {
    async fn upload(&self, credential: &str, file: UploadFile) -> Result<String, UploadError> {
        if !self.verifier.verify(credential) {
            return Err(UploadError::Unauthorized);
        }
        Ok(self.store.put(&file.file_name, &file.bytes).await?)
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Client-side host: posts each file to the admin upload endpoint.
#[derive(Debug, Clone)]
pub struct HttpImageHost {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpImageHost {
    /// Create a host posting to `{admin_url}/api/admin/upload`.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Request` if `admin_url` is not an absolute URL.
    pub fn new(admin_url: &str) -> Result<Self, UploadError> {
        let mut endpoint =
            Url::parse(admin_url).map_err(|e| UploadError::Request(format!("{admin_url}: {e}")))?;
        let path = format!("{}/api/admin/upload", endpoint.path().trim_end_matches('/'));
        endpoint.set_path(&path);

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ImageHost for HttpImageHost {
    #[instrument(skip(self, credential, file), fields(file = %file.file_name))]
    async fn upload(&self, credential: &str, file: UploadFile) -> Result<String, UploadError> {
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| UploadError::Request(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ADMIN_KEY_HEADER, credential)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(UploadError::Unauthorized);
        }
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map_or_else(|_| "Upload failed".to_string(), |body| body.error);
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Response(e.to_string()))?;
        Ok(body.url)
    }
}
