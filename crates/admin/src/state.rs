//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::{CredentialVerifier, FsBlobStore, SharedSecretVerifier};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    verifier: Arc<dyn CredentialVerifier>,
    blobs: FsBlobStore,
}

impl AppState {
    /// Create state that verifies against the configured admin secret and
    /// stores uploads in the configured directory.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let verifier = Arc::new(SharedSecretVerifier::new(config.admin_secret.clone()));
        Self::with_verifier(config, pool, verifier)
    }

    /// Create state with an explicit credential verifier.
    #[must_use]
    pub fn with_verifier(
        config: AdminConfig,
        pool: PgPool,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        let blobs = FsBlobStore::new(&config.uploads_dir, &config.uploads_public_url);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                verifier,
                blobs,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Verifier for the `x-admin-key` credential.
    #[must_use]
    pub fn verifier(&self) -> &dyn CredentialVerifier {
        self.inner.verifier.as_ref()
    }

    /// Blob store backing the upload endpoints.
    #[must_use]
    pub fn blobs(&self) -> &FsBlobStore {
        &self.inner.blobs
    }
}
