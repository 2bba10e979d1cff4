//! Cart route handlers.
//!
//! The cart lives in the session as a list of product ids and is reconciled
//! against the shared catalog snapshot on every request. All handlers answer
//! with the resulting [`CartView`].

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use teslix_core::cart::{CartManager, MAX_CART_ITEMS};
use teslix_core::{CartItem, ContactDetails, ProductId};

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::CartView;
use crate::routes::prefs::current_locale;
use crate::services::{OrderService, SessionCartStorage};
use crate::state::AppState;

/// Body for add/remove.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub product_id: ProductId,
}

/// Body for `POST /cart/sync`: items held by the client.
#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub items: Vec<CartItem>,
}

async fn load(state: &AppState, session: Session) -> CartManager<SessionCartStorage> {
    state
        .catalog()
        .cart_for(session, &ProductRepository::new(state.pool()))
        .await
}

/// Show the cart.
#[instrument(skip_all)]
pub async fn show(State(state): State<AppState>, session: Session) -> Json<CartView> {
    let cart = load(&state, session).await;
    Json(CartView::from(&cart))
}

/// Add a product. Adding a product already in the cart changes nothing.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CartItemRequest>,
) -> Json<CartView> {
    let mut cart = load(&state, session).await;
    if cart.add(body.product_id).await {
        state
            .catalog()
            .reconcile(&mut cart, &ProductRepository::new(state.pool()))
            .await;
    }
    Json(CartView::from(&cart))
}

/// Remove a product.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CartItemRequest>,
) -> Json<CartView> {
    let mut cart = load(&state, session).await;
    cart.remove(&body.product_id).await;
    Json(CartView::from(&cart))
}

/// Empty the cart.
#[instrument(skip_all)]
pub async fn clear(State(state): State<AppState>, session: Session) -> Json<CartView> {
    let mut cart = load(&state, session).await;
    cart.clear().await;
    Json(CartView::from(&cart))
}

/// Merge a client-held copy of the cart into the session cart.
///
/// Items already in the session keep their quantity. Snapshots larger than
/// [`MAX_CART_ITEMS`] are rejected before the session is touched.
#[instrument(skip_all, fields(items = body.items.len()))]
pub async fn sync(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SyncRequest>,
) -> Result<Json<CartView>> {
    if body.items.len() > MAX_CART_ITEMS {
        return Err(AppError::BadRequest(format!(
            "Too many cart items (max {MAX_CART_ITEMS})"
        )));
    }

    let mut cart = load(&state, session).await;
    if cart.merge(body.items).await {
        state
            .catalog()
            .reconcile(&mut cart, &ProductRepository::new(state.pool()))
            .await;
    }
    Ok(Json(CartView::from(&cart)))
}

/// Number of resolved items, for the header badge.
#[instrument(skip_all)]
pub async fn count(State(state): State<AppState>, session: Session) -> Json<Value> {
    let cart = load(&state, session).await;
    Json(json!({ "count": cart.totals().total_count }))
}

/// Send the cart with the customer's contact details.
///
/// The cart is cleared only after the message was delivered; on failure it
/// is left as is and a localized retry message is returned.
#[instrument(skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    body: std::result::Result<Json<ContactDetails>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(contact) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if contact.name.trim().is_empty() {
        return Err(AppError::BadRequest("Missing name".to_string()));
    }

    let telegram = state.telegram().ok_or_else(|| {
        AppError::Configuration("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set".to_string())
    })?;
    let locale = current_locale(&session).await;
    let mut cart = load(&state, session).await;
    let reservations = ProductRepository::new(state.pool());

    let receipt = OrderService::new(telegram, &reservations)
        .checkout(&mut cart, locale, &contact)
        .await
        .map_err(|e| AppError::Submission(e, locale))?;

    Ok(Json(json!({ "ok": true, "reserved": receipt.reserved })))
}
