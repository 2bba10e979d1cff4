//! Cart plumbing for the storefront: session-backed cart storage and the
//! process-wide catalog snapshot carts resolve against.

use std::sync::Arc;

use tokio::sync::RwLock;
use tower_sessions::Session;
use tracing::{debug, warn};

use teslix_core::cart::{CartItem, CartManager, CartStorage, CatalogSource, StorageError};
use teslix_core::catalog::{CatalogSnapshot, Product, demo_products};

use crate::models::session::keys;

/// Stores the cart item list under the session key `teslix_cart`.
#[derive(Clone)]
pub struct SessionCartStorage {
    session: Session,
}

impl SessionCartStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartStorage for SessionCartStorage {
    async fn load(&self) -> Result<Option<Vec<CartItem>>, StorageError> {
        self.session
            .get::<Vec<CartItem>>(keys::CART)
            .await
            .map_err(|e| StorageError::Malformed(e.to_string()))
    }

    async fn save(&self, items: &[CartItem]) -> Result<(), StorageError> {
        self.session
            .insert(keys::CART, items)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))
    }
}

/// Shared catalog snapshot, seeded with the demo catalog.
///
/// Refreshes replace the whole snapshot; concurrent refreshes are last write
/// wins.
#[derive(Debug)]
pub struct CatalogStore {
    snapshot: RwLock<Arc<CatalogSnapshot>>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new(demo_products())
    }
}

impl CatalogStore {
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(CatalogSnapshot::new(products))),
        }
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Replace the snapshot.
    pub async fn publish(&self, snapshot: Arc<CatalogSnapshot>) {
        *self.snapshot.write().await = snapshot;
    }

    /// Fetch from `source` and publish the result. A failed fetch keeps the
    /// current snapshot.
    pub async fn refresh<C: CatalogSource>(&self, source: &C) -> bool {
        match source.fetch().await {
            Ok(products) => {
                debug!(count = products.len(), "Catalog store refreshed");
                self.publish(Arc::new(CatalogSnapshot::new(products))).await;
                true
            }
            Err(e) => {
                warn!(error = %e, "Catalog refresh failed, keeping current snapshot");
                false
            }
        }
    }

    /// Build a cart manager for this request: restore the session cart and
    /// resolve any unknown items against `source`, publishing a refreshed
    /// snapshot back to the store.
    pub async fn cart_for<C: CatalogSource>(
        &self,
        session: Session,
        source: &C,
    ) -> CartManager<SessionCartStorage> {
        let mut cart = CartManager::new(SessionCartStorage::new(session), self.snapshot().await);
        cart.restore().await;
        self.reconcile(&mut cart, source).await;
        cart
    }

    /// Refresh the cart's catalog from `source` when it holds unknown items,
    /// publishing the fresh snapshot for other requests.
    pub async fn reconcile<S: CartStorage, C: CatalogSource>(
        &self,
        cart: &mut CartManager<S>,
        source: &C,
    ) {
        if cart.refresh_catalog(source).await {
            self.publish(Arc::clone(cart.catalog())).await;
        }
    }
}
