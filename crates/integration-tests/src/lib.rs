//! Integration tests for Teslix Parts.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and seed a database, then start both services
//! cargo run -p teslix-cli -- migrate
//! cargo run -p teslix-cli -- seed demo
//! cargo run -p teslix-storefront &
//! cargo run -p teslix-admin &
//!
//! # Run the ignored tests against them
//! cargo test -p teslix-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - Storefront under test (default: <http://localhost:3000>)
//! - `ADMIN_BASE_URL` - Admin under test (default: <http://localhost:3001>)
//! - `ADMIN_SECRET` - Admin key the admin server was started with

use reqwest::Client;

/// Header carrying the admin key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Base URL of the storefront under test.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL of the admin server under test.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Admin key, if configured for the run.
#[must_use]
pub fn admin_secret() -> Option<String> {
    std::env::var("ADMIN_SECRET").ok()
}

/// Client that keeps the session cookie between requests, like a browser.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialized.
#[must_use]
#[allow(clippy::expect_used)]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
