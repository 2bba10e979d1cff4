//! Admin key check for the login form.

use axum::Json;
use serde_json::{Value, json};

use crate::middleware::RequireAdminKey;

/// Succeeds when the `x-admin-key` header verifies.
///
/// The extractor answers 401 otherwise.
pub async fn login(RequireAdminKey(_): RequireAdminKey) -> Json<Value> {
    Json(json!({ "ok": true }))
}
