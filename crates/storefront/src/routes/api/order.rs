//! Order intake endpoint.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::instrument;

use teslix_core::order::OrderRequest;

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::services::OrderService;
use crate::state::AppState;

/// Deliver an order message to the shop chat, then reserve the listed
/// products.
///
/// Responds `{ok: true}`. A missing bot configuration is reported before the
/// payload is looked at.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Result<Json<Value>> {
    let telegram = state.telegram().ok_or_else(|| {
        AppError::Configuration("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set".to_string())
    })?;
    let reservations = ProductRepository::new(state.pool());

    OrderService::new(telegram, &reservations)
        .submit(&request)
        .await?;

    Ok(Json(json!({ "ok": true })))
}
