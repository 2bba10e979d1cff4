//! Vehicle repository: cars listed for parting out.

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use teslix_core::catalog::NewVehicle;
use teslix_core::rows::{VEHICLE_COLUMNS, VehicleRow};
use teslix_core::{Vehicle, VehicleId};

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

    /// Insert a validated vehicle under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, vehicle), fields(vin = %vehicle.vin))]
    pub async fn create(&self, vehicle: &NewVehicle) -> Result<Vehicle, RepositoryError> {
        let id = Uuid::new_v4().to_string();
        let sql = format!(
            "INSERT INTO vehicles (id, make, model, year, vin, mileage, images, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {VEHICLE_COLUMNS}"
        );
        let mileage = vehicle
            .mileage
            .map(i32::try_from)
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(format!("mileage out of range: {e}")))?;

        let row: VehicleRow = sqlx::query_as(&sql)
            .bind(&id)
            .bind(&vehicle.make)
            .bind(&vehicle.model)
            .bind(i32::from(vehicle.year))
            .bind(&vehicle.vin)
            .bind(mileage)
            .bind(&vehicle.images)
            .bind(vehicle.status.as_str())
            .fetch_one(self.pool)
            .await?;

        Ok(Vehicle::try_from(row)?)
    }

    /// Delete a vehicle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row was deleted.
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self), fields(vehicle_id = %id))]
    pub async fn delete(&self, id: &VehicleId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
