//! Catalog read endpoint.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use teslix_core::{CatalogFilter, CatalogSnapshot, Product};

use crate::db::products::ProductRepository;
use crate::error::Result;
use crate::state::AppState;

/// List products in stock or reserved, newest first.
///
/// Every successful read also refreshes the shared catalog snapshot carts
/// resolve against; the filter applies to the response only.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<CatalogFilter>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list_listed().await?;

    state
        .catalog()
        .publish(Arc::new(CatalogSnapshot::new(products.clone())))
        .await;

    Ok(Json(filter.apply(products)))
}
