//! Product repository: listed catalog reads and post-order reservation.

use sqlx::PgPool;
use tracing::instrument;

use teslix_core::rows::{PRODUCT_COLUMNS, ProductRow};
use teslix_core::{Availability, CatalogError, CatalogSource, Product, ProductId};

use super::RepositoryError;
use crate::services::order::ReservationStore;

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Products visible in the storefront (in stock or reserved), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row holds an invalid price or status.
    #[instrument(skip(self))]
    pub async fn list_listed(&self) -> Result<Vec<Product>, RepositoryError> {
        let listed = vec![
            Availability::InStock.as_str(),
            Availability::Reserved.as_str(),
        ];
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE availability = ANY($1) \
             ORDER BY created_at DESC"
        );

        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(listed)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter()
            .map(|row| Product::try_from(row).map_err(RepositoryError::from))
            .collect()
    }

    /// Mark products as reserved. Unknown ids are ignored.
    ///
    /// Returns the number of rows updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    #[instrument(skip(self), fields(count = ids.len()))]
    pub async fn mark_reserved(&self, ids: &[ProductId]) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let ids: Vec<&str> = ids.iter().map(ProductId::as_str).collect();
        let result = sqlx::query(
            "UPDATE products SET availability = $1, updated_at = now() WHERE id = ANY($2)",
        )
        .bind(Availability::Reserved.as_str())
        .bind(ids)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

impl CatalogSource for ProductRepository<'_> {
    async fn fetch(&self) -> Result<Vec<Product>, CatalogError> {
        self.list_listed()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))
    }
}

impl ReservationStore for ProductRepository<'_> {
    async fn reserve(&self, ids: &[ProductId]) -> Result<u64, RepositoryError> {
        self.mark_reserved(ids).await
    }
}
