//! Vehicle read endpoint.

use axum::{Json, extract::State};
use tracing::instrument;

use teslix_core::Vehicle;

use crate::db::vehicles::VehicleRepository;
use crate::error::Result;
use crate::state::AppState;

/// List all vehicles, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Vehicle>>> {
    let vehicles = VehicleRepository::new(state.pool()).list().await?;
    Ok(Json(vehicles))
}
