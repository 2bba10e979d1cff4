//! Database row shapes for catalog tables (`postgres` feature).
//!
//! Statuses are stored as their snake_case wire names; rows written by older
//! tooling may still carry the legacy Russian labels, which parse through the
//! same aliases as the JSON format.

use chrono::{DateTime, Utc};

use crate::catalog::{Product, Vehicle};
use crate::types::{Availability, Condition, Price, ProductId, VehicleId, VehicleStatus};

/// Columns selected for a product, in table order.
pub const PRODUCT_COLUMNS: &str = "id, title, description, price, images, sku, tags, oem, \
     compatibility, condition, availability, created_at, updated_at";

/// Columns selected for a vehicle, in table order.
pub const VEHICLE_COLUMNS: &str = "id, make, model, year, vin, mileage, images, status, created_at";

/// A row that could not be turned into a domain record.
#[derive(thiserror::Error, Debug)]
#[error("invalid {table} row {id}: {reason}")]
pub struct RowError {
    pub table: &'static str,
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub images: Vec<String>,
    pub sku: Option<String>,
    pub tags: Vec<String>,
    pub oem: Option<String>,
    pub compatibility: Option<String>,
    pub condition: Option<String>,
    pub availability: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RowError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let invalid = |reason: String| RowError {
            table: "products",
            id: row.id.clone(),
            reason,
        };

        let price = Price::new(row.price).map_err(|e| invalid(e.to_string()))?;
        let condition = row
            .condition
            .as_deref()
            .map(str::parse::<Condition>)
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;
        let availability = row
            .availability
            .as_deref()
            .map(str::parse::<Availability>)
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            id: ProductId::new(row.id),
            title: row.title,
            description: row.description,
            price,
            images: row.images,
            sku: row.sku,
            tags: row.tags,
            oem: row.oem,
            compatibility: row.compatibility,
            condition,
            availability,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VehicleRow {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vin: String,
    pub mileage: Option<i32>,
    pub images: Vec<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = RowError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let invalid = |reason: String| RowError {
            table: "vehicles",
            id: row.id.clone(),
            reason,
        };

        let year = u16::try_from(row.year).map_err(|e| invalid(format!("year: {e}")))?;
        let mileage = row
            .mileage
            .map(u32::try_from)
            .transpose()
            .map_err(|e| invalid(format!("mileage: {e}")))?;

        Ok(Self {
            id: VehicleId::new(row.id),
            make: row.make,
            model: row.model,
            year,
            vin: row.vin,
            mileage,
            images: row.images,
            status: VehicleStatus::normalize(row.status.as_deref()),
            created_at: Some(row.created_at),
        })
    }
}
