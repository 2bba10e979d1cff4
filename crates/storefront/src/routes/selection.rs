//! Parts lookup by VIN.
//!
//! The lookup form is rendered into a message and sent through the same
//! order flow, without product ids.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use teslix_core::order::{OrderRequest, SelectionRequest, render_selection_message};

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::routes::prefs::current_locale;
use crate::services::OrderService;
use crate::state::AppState;

/// Send a parts lookup request to the shop chat.
#[instrument(skip_all, fields(model = %request.model))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<Value>> {
    let telegram = state.telegram().ok_or_else(|| {
        AppError::Configuration("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set".to_string())
    })?;
    let locale = current_locale(&session).await;
    let reservations = ProductRepository::new(state.pool());

    let order = OrderRequest {
        message: render_selection_message(locale, &request),
        product_ids: Vec::new(),
    };
    OrderService::new(telegram, &reservations)
        .submit(&order)
        .await
        .map_err(|e| AppError::Submission(e, locale))?;

    Ok(Json(json!({ "ok": true })))
}
