//! Product repository: listing management.

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use teslix_core::catalog::NewProduct;
use teslix_core::rows::{PRODUCT_COLUMNS, ProductRow};
use teslix_core::{Availability, Condition, Product, ProductId};

use super::RepositoryError;

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

    /// All products regardless of availability, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row holds an invalid price or status.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC");
        let rows: Vec<ProductRow> = sqlx::query_as(&sql).fetch_all(self.pool).await?;

        rows.into_iter()
            .map(|row| Product::try_from(row).map_err(RepositoryError::from))
            .collect()
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(Product::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    /// Insert a validated product under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, product), fields(title = %product.title))]
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let id = Uuid::new_v4().to_string();
        let sql = format!(
            "INSERT INTO products (id, title, description, price, images, sku, tags, oem, \
             compatibility, condition, availability) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {PRODUCT_COLUMNS}"
        );

        let row: ProductRow = sqlx::query_as(&sql)
            .bind(&id)
            .bind(&product.title)
            .bind(&product.description)
            .bind(product.price.amount())
            .bind(&product.images)
            .bind(&product.sku)
            .bind(&product.tags)
            .bind(&product.oem)
            .bind(&product.compatibility)
            .bind(product.condition.map(Condition::as_str))
            .bind(product.availability.map(Availability::as_str))
            .fetch_one(self.pool)
            .await?;

        Ok(Product::try_from(row)?)
    }

    /// Write every editable field of `product`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product no longer exists.
    /// Returns `RepositoryError::Database` if the update fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn update(&self, product: &Product) -> Result<Product, RepositoryError> {
        let sql = format!(
            "UPDATE products SET title = $2, description = $3, price = $4, images = $5, \
             sku = $6, tags = $7, oem = $8, compatibility = $9, condition = $10, \
             availability = $11, updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        );

        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(product.id.as_str())
            .bind(&product.title)
            .bind(&product.description)
            .bind(product.price.amount())
            .bind(&product.images)
            .bind(&product.sku)
            .bind(&product.tags)
            .bind(&product.oem)
            .bind(&product.compatibility)
            .bind(product.condition.map(Condition::as_str))
            .bind(product.availability.map(Availability::as_str))
            .fetch_optional(self.pool)
            .await?;

        let row = row.ok_or(RepositoryError::NotFound)?;
        Ok(Product::try_from(row)?)
    }

    /// Insert or replace a product keeping its id. Used for seeding.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn upsert(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO products (id, title, description, price, images, sku, tags, oem, \
             compatibility, condition, availability) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (id) DO UPDATE SET title = EXCLUDED.title, \
             description = EXCLUDED.description, price = EXCLUDED.price, \
             images = EXCLUDED.images, sku = EXCLUDED.sku, tags = EXCLUDED.tags, \
             oem = EXCLUDED.oem, compatibility = EXCLUDED.compatibility, \
             condition = EXCLUDED.condition, availability = EXCLUDED.availability, \
             updated_at = now()",
        )
        .bind(product.id.as_str())
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(&product.images)
        .bind(&product.sku)
        .bind(&product.tags)
        .bind(&product.oem)
        .bind(&product.compatibility)
        .bind(product.condition.map(Condition::as_str))
        .bind(product.availability.map(Availability::as_str))
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row was deleted.
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
