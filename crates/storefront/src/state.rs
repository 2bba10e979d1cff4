//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::{CatalogStore, TelegramClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: CatalogStore,
    telegram: Option<TelegramClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The catalog store starts with the demo catalog; the Telegram client is
    /// built only when both bot token and chat id are configured.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let telegram = config.telegram.as_ref().map(TelegramClient::new);
        Self::with_telegram(config, pool, telegram)
    }

    /// Create state with an explicit Telegram client.
    #[must_use]
    pub fn with_telegram(
        config: StorefrontConfig,
        pool: PgPool,
        telegram: Option<TelegramClient>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog: CatalogStore::default(),
                telegram,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the shared catalog snapshot store.
    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }

    /// Get the Telegram client, if order notifications are configured.
    #[must_use]
    pub fn telegram(&self) -> Option<&TelegramClient> {
        self.inner.telegram.as_ref()
    }
}
