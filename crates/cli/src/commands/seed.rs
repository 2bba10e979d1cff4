//! Seed the database with the demo catalog.
//!
//! The storefront falls back to the same four products while the catalog
//! has not loaded, so a seeded database shows identical listings. Seeding is
//! idempotent: rows are upserted by id.

use secrecy::SecretString;
use tracing::info;

use teslix_admin::db::{self, ProductRepository, RepositoryError};
use teslix_core::catalog::demo_products;

/// Upsert the demo products.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an upsert fails.
pub async fn demo(database_url: &SecretString) -> Result<(), RepositoryError> {
    let pool = db::create_pool(database_url).await?;
    info!("Connected to database");

    let repo = ProductRepository::new(&pool);
    let products = demo_products();
    for product in &products {
        repo.upsert(product).await?;
        info!(product_id = %product.id, title = %product.title, "Seeded product");
    }

    info!(count = products.len(), "Demo catalog seeded");
    Ok(())
}
