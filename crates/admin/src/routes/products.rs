//! Product management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::instrument;

use teslix_core::images::{ImageEdit, ImageSelection};
use teslix_core::{Product, ProductDraft, ProductId, ProductPatch};

use super::DeleteQuery;
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminKey;
use crate::state::AppState;

/// All products regardless of availability, newest first.
#[instrument(skip_all)]
pub async fn index(
    RequireAdminKey(_): RequireAdminKey,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(Json(products))
}

/// Validate and insert a product.
#[instrument(skip_all)]
pub async fn create(
    RequireAdminKey(_): RequireAdminKey,
    State(state): State<AppState>,
    body: std::result::Result<Json<ProductDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(draft) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let product = draft.validate()?;

    let created = ProductRepository::new(state.pool())
        .create(&product)
        .await?;
    tracing::info!(product_id = %created.id, "Product created");

    Ok((StatusCode::CREATED, Json(json!({ "id": created.id }))))
}

/// Apply a partial update.
#[instrument(skip(state, body))]
pub async fn update(
    RequireAdminKey(_): RequireAdminKey,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Json<Product>> {
    let Json(patch) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let repo = ProductRepository::new(state.pool());
    let id = ProductId::new(id);

    let current = repo
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let updated = repo.update(&patch.apply(&current)?).await?;
    tracing::info!(product_id = %updated.id, "Product updated");

    Ok(Json(updated))
}

/// Reorder or prune a product's images. The first image is the thumbnail.
///
/// An edit that changes nothing returns the product without writing; an edit
/// that would leave no images fails validation.
#[instrument(skip(state, body))]
pub async fn edit_images(
    RequireAdminKey(_): RequireAdminKey,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<ImageEdit>, JsonRejection>,
) -> Result<Json<Product>> {
    let Json(edit) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let repo = ProductRepository::new(state.pool());
    let id = ProductId::new(id);

    let current = repo
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let mut selection = ImageSelection::from(current.images.clone());
    if !selection.apply(edit) {
        return Ok(Json(current));
    }

    let patch = ProductPatch {
        images: Some(selection.into_vec()),
        ..ProductPatch::default()
    };
    let updated = repo.update(&patch.apply(&current)?).await?;
    tracing::info!(product_id = %updated.id, images = updated.images.len(), "Product images edited");

    Ok(Json(updated))
}

/// Delete a product by `?id=`.
#[instrument(skip_all)]
pub async fn destroy(
    RequireAdminKey(_): RequireAdminKey,
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode> {
    let id = query
        .id()
        .ok_or_else(|| AppError::BadRequest("Missing id".to_string()))?;

    ProductRepository::new(state.pool())
        .delete(&ProductId::new(id))
        .await?;
    tracing::info!(product_id = %id, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}
