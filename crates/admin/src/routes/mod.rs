//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                     - Health check
//! GET    /health/ready               - Readiness check (database)
//!
//! # Admin API (x-admin-key)
//! POST   /api/admin/login            - Check the admin key
//! GET    /api/admin/products         - All products, newest first
//! POST   /api/admin/products         - Create a product
//! PATCH  /api/admin/products/{id}    - Partial update
//! POST   /api/admin/products/{id}/images - Reorder, append or remove images
//! DELETE /api/admin/products?id=     - Delete a product
//! POST   /api/admin/cars             - Create a vehicle
//! DELETE /api/admin/cars?id=         - Delete a vehicle
//! POST   /api/admin/upload           - Store one image
//! POST   /api/admin/upload/batch     - Run the intake pipeline on a batch
//!
//! # Admin API (open)
//! GET    /api/admin/images           - Reusable part image filenames
//! ```

pub mod auth;
pub mod cars;
pub mod images;
pub mod products;
pub mod uploads;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};
use serde::Deserialize;

use crate::state::AppState;

/// Query string of the delete endpoints.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<String>,
}

impl DeleteQuery {
    /// The id to delete, if present and not blank.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

/// Create the `/api/admin` router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route(
            "/products",
            get(products::index)
                .post(products::create)
                .delete(products::destroy),
        )
        .route("/products/{id}", patch(products::update))
        .route("/products/{id}/images", post(products::edit_images))
        .route("/cars", post(cars::create).delete(cars::destroy))
        .route(
            "/upload",
            post(uploads::single).layer(DefaultBodyLimit::max(uploads::SINGLE_BODY_LIMIT)),
        )
        .route(
            "/upload/batch",
            post(uploads::batch).layer(DefaultBodyLimit::max(uploads::BATCH_BODY_LIMIT)),
        )
        .route("/images", get(images::index))
}

/// Create all admin routes.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api/admin", admin_routes())
}
