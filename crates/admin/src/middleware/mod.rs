//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (add unique ID to each request)
//!
//! Authorization is per handler through the [`RequireAdminKey`] extractor.

pub mod auth;
pub mod request_id;

pub use auth::{AdminKeyRejection, RequireAdminKey};
pub use request_id::request_id_middleware;
