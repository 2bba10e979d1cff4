//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Catalog API
//! GET  /api/products           - Listed products, newest first (?model=&category=&q=)
//! GET  /api/cars               - Vehicles, newest first
//! GET  /api/work-photos        - Numbered work photo URLs
//! POST /api/order              - Submit an order message (rate limited)
//!
//! # Cart (JSON, session-backed)
//! GET  /cart                   - Cart view
//! POST /cart/add               - Add a product (no-op if present)
//! POST /cart/remove            - Remove a product
//! POST /cart/clear             - Empty the cart
//! POST /cart/sync              - Merge items held by the client
//! GET  /cart/count             - Item count
//! POST /cart/checkout          - Send the cart with contact details (rate limited)
//!
//! # Parts lookup
//! POST /selection              - Parts lookup by VIN (rate limited)
//!
//! # Preferences
//! GET  /prefs/lang             - Current language
//! POST /prefs/lang             - Set language
//! GET  /prefs/welcome          - Whether to show the welcome banner
//!
//! # Static
//! GET  /uploads/*              - Uploaded listing images
//! GET  /work/*                 - Work photos
//! ```

pub mod api;
pub mod cart;
pub mod prefs;
pub mod selection;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, order_rate_limiter};
use crate::state::AppState;

/// Create the public JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(api::products::index))
        .route("/cars", get(api::cars::index))
        .route("/work-photos", get(api::work_photos::index))
        .route(
            "/order",
            post(api::order::submit).layer(order_rate_limiter()),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/sync", post(cart::sync))
        .route("/count", get(cart::count))
        .layer(api_rate_limiter())
        .route(
            "/checkout",
            post(cart::checkout).layer(order_rate_limiter()),
        )
}

/// Create the preference routes router.
pub fn prefs_routes() -> Router<AppState> {
    Router::new()
        .route("/lang", get(prefs::language).post(prefs::set_language))
        .route("/welcome", get(prefs::welcome))
        .layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api", api_routes())
        .nest("/cart", cart_routes())
        .nest("/prefs", prefs_routes())
        .route(
            "/selection",
            post(selection::submit).layer(order_rate_limiter()),
        )
}
