//! Vehicle repository (read only in the storefront).

use sqlx::PgPool;
use tracing::instrument;

use teslix_core::Vehicle;
use teslix_core::rows::{VEHICLE_COLUMNS, VehicleRow};

use super::RepositoryError;

/// Repository for vehicle database operations.
pub struct VehicleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VehicleRepository<'a> {
    /// Create a new vehicle repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All vehicles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Vehicle>, RepositoryError> {
        let sql = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles ORDER BY created_at DESC");
        let rows: Vec<VehicleRow> = sqlx::query_as(&sql).fetch_all(self.pool).await?;

        rows.into_iter()
            .map(|row| Vehicle::try_from(row).map_err(RepositoryError::from))
            .collect()
    }
}
