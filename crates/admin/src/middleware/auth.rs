//! Admin credential extractor.
//!
//! Write endpoints take [`RequireAdminKey`] as an argument; requests without
//! a verifying `x-admin-key` header are rejected before the handler runs.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::services::intake::ADMIN_KEY_HEADER;
use crate::state::AppState;

/// Extractor that requires a valid admin key.
///
/// Holds the presented credential so handlers can forward it to an
/// [`ImageHost`](crate::services::ImageHost).
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdminKey(_): RequireAdminKey) -> StatusCode {
///     StatusCode::NO_CONTENT
/// }
/// ```
pub struct RequireAdminKey(pub String);

/// Returned when the admin key is missing or wrong.
#[derive(Debug)]
pub struct AdminKeyRejection;

impl IntoResponse for AdminKeyRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for RequireAdminKey {
    type Rejection = AdminKeyRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(AdminKeyRejection)?;

        if !state.verifier().verify(credential) {
            tracing::warn!(uri = %parts.uri, "Rejected admin key");
            return Err(AdminKeyRejection);
        }

        Ok(Self(credential.to_string()))
    }
}
