//! Vehicle management endpoints.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::instrument;

use teslix_core::{VehicleDraft, VehicleId};

use super::DeleteQuery;
use crate::db::VehicleRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminKey;
use crate::state::AppState;

/// Validate and insert a vehicle.
#[instrument(skip_all)]
pub async fn create(
    RequireAdminKey(_): RequireAdminKey,
    State(state): State<AppState>,
    body: std::result::Result<Json<VehicleDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(draft) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let vehicle = draft.validate()?;

    let created = VehicleRepository::new(state.pool())
        .create(&vehicle)
        .await?;
    tracing::info!(vehicle_id = %created.id, "Vehicle created");

    Ok((StatusCode::CREATED, Json(json!({ "id": created.id }))))
}

/// Delete a vehicle by `?id=`.
#[instrument(skip_all)]
pub async fn destroy(
    RequireAdminKey(_): RequireAdminKey,
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode> {
    let id = query
        .id()
        .ok_or_else(|| AppError::BadRequest("Missing id".to_string()))?;

    VehicleRepository::new(state.pool())
        .delete(&VehicleId::new(id))
        .await?;
    tracing::info!(vehicle_id = %id, "Vehicle deleted");

    Ok(StatusCode::NO_CONTENT)
}
