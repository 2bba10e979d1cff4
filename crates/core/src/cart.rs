//! Shopping cart state.
//!
//! [`Cart`] is the pure item list. [`CartManager`] wraps it with an injected
//! [`CartStorage`] for durability and a [`CatalogSnapshot`] to resolve items
//! against. Items may reference products the snapshot does not (yet) know;
//! those are kept but excluded from totals and rendered lines.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{CatalogSnapshot, Product};
use crate::types::ProductId;

/// One selected product and its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CartItem {
    #[must_use]
    pub const fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            quantity: 1,
        }
    }
}

/// Totals over the items that resolve in the current catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub total: i64,
    pub total_count: u32,
}

/// Upper bound on distinct items a client may submit in one cart snapshot.
pub const MAX_CART_ITEMS: usize = 200;

/// Ordered cart items with unique product ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|i| &i.product_id == product_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a product with quantity 1. Adding an id already in the cart is a
    /// no-op; each listing is a single unit of stock.
    ///
    /// Returns whether the cart changed.
    pub fn add(&mut self, product_id: ProductId) -> bool {
        if self.contains(&product_id) {
            return false;
        }
        self.items.push(CartItem::new(product_id));
        true
    }

    /// Remove a product. Returns whether the cart changed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| &i.product_id != product_id);
        self.items.len() != before
    }

    /// Empty the cart. Returns whether the cart changed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.items.is_empty();
        self.items.clear();
        changed
    }

    /// Merge a restored snapshot into the cart.
    ///
    /// Items already present win; snapshot items with unseen ids are appended
    /// in snapshot order. Zero quantities and repeated ids in the snapshot are
    /// dropped. Returns whether the cart changed.
    pub fn merge(&mut self, snapshot: Vec<CartItem>) -> bool {
        let mut seen: HashSet<ProductId> =
            self.items.iter().map(|i| i.product_id.clone()).collect();
        let before = self.items.len();
        for item in snapshot {
            if item.quantity == 0 || !seen.insert(item.product_id.clone()) {
                continue;
            }
            self.items.push(item);
        }
        self.items.len() != before
    }

    /// Sum price × quantity and quantities over resolvable items.
    #[must_use]
    pub fn totals(&self, catalog: &CatalogSnapshot) -> CartTotals {
        self.resolved(catalog)
            .fold(CartTotals::default(), |acc, (item, product)| CartTotals {
                total: acc
                    .total
                    .saturating_add(product.price.line_total(item.quantity)),
                total_count: acc.total_count.saturating_add(item.quantity),
            })
    }

    /// Items paired with their catalog product; unresolved items are skipped.
    pub fn resolved<'a>(
        &'a self,
        catalog: &'a CatalogSnapshot,
    ) -> impl Iterator<Item = (&'a CartItem, &'a Product)> + 'a {
        self.items
            .iter()
            .filter_map(|item| catalog.get(&item.product_id).map(|p| (item, p)))
    }

    /// Whether any item is missing from the catalog.
    #[must_use]
    pub fn has_unresolved(&self, catalog: &CatalogSnapshot) -> bool {
        self.items.iter().any(|i| !catalog.contains(&i.product_id))
    }

    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        cart.merge(items);
        cart
    }
}

// =============================================================================
// Collaborators
// =============================================================================

/// Errors from the durable cart store.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("malformed cart snapshot: {0}")]
    Malformed(String),
}

/// Errors fetching the catalog.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage for the cart item list.
pub trait CartStorage: Send + Sync {
    /// Load the stored snapshot; `Ok(None)` when nothing is stored.
    fn load(&self) -> impl Future<Output = Result<Option<Vec<CartItem>>, StorageError>> + Send;

    /// Replace the stored snapshot with `items`.
    fn save(&self, items: &[CartItem]) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Source of the full product catalog.
pub trait CatalogSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;
}

// =============================================================================
// Manager
// =============================================================================

/// Cart plus its storage and the catalog snapshot it resolves against.
#[derive(Debug)]
pub struct CartManager<S> {
    cart: Cart,
    storage: S,
    catalog: Arc<CatalogSnapshot>,
}

impl<S: CartStorage> CartManager<S> {
    /// Start with an empty in-memory cart.
    pub const fn new(storage: S, catalog: Arc<CatalogSnapshot>) -> Self {
        Self {
            cart: Cart::new(),
            storage,
            catalog,
        }
    }

    /// Start from items already present in the session.
    pub const fn with_cart(cart: Cart, storage: S, catalog: Arc<CatalogSnapshot>) -> Self {
        Self {
            cart,
            storage,
            catalog,
        }
    }

    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub const fn catalog(&self) -> &Arc<CatalogSnapshot> {
        &self.catalog
    }

    pub fn set_catalog(&mut self, catalog: Arc<CatalogSnapshot>) {
        self.catalog = catalog;
    }

    /// Load the durable snapshot and merge it into the current cart.
    ///
    /// Load failures leave the cart untouched. Returns whether the cart changed.
    pub async fn restore(&mut self) -> bool {
        let snapshot = match self.storage.load().await {
            Ok(Some(items)) => items,
            Ok(None) => return false,
            Err(e) => {
                warn!(error = %e, "Failed to load cart snapshot");
                return false;
            }
        };

        let changed = self.cart.merge(snapshot);
        if changed {
            self.persist().await;
        }
        changed
    }

    /// Merge items held elsewhere (e.g. a client-side copy) with the same
    /// precedence as [`restore`](Self::restore).
    pub async fn merge(&mut self, items: Vec<CartItem>) -> bool {
        let changed = self.cart.merge(items);
        if changed {
            self.persist().await;
        }
        changed
    }

    pub async fn add(&mut self, product_id: ProductId) -> bool {
        let changed = self.cart.add(product_id);
        if changed {
            self.persist().await;
        }
        changed
    }

    pub async fn remove(&mut self, product_id: &ProductId) -> bool {
        let changed = self.cart.remove(product_id);
        if changed {
            self.persist().await;
        }
        changed
    }

    pub async fn clear(&mut self) {
        self.cart.clear();
        self.persist().await;
    }

    /// Replace the catalog snapshot when any item is unresolved.
    ///
    /// A failed fetch keeps the current snapshot. Returns whether the snapshot
    /// was replaced.
    pub async fn refresh_catalog<C: CatalogSource>(&mut self, source: &C) -> bool {
        if !self.cart.has_unresolved(&self.catalog) {
            return false;
        }

        match source.fetch().await {
            Ok(products) => {
                debug!(count = products.len(), "Catalog refreshed for cart");
                self.catalog = Arc::new(CatalogSnapshot::new(products));
                true
            }
            Err(e) => {
                warn!(error = %e, "Catalog refresh failed, keeping current snapshot");
                false
            }
        }
    }

    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.cart.totals(&self.catalog)
    }

    /// Owned `(item, product)` pairs for rendering.
    #[must_use]
    pub fn resolved_lines(&self) -> Vec<(CartItem, Product)> {
        self.cart
            .resolved(&self.catalog)
            .map(|(i, p)| (i.clone(), p.clone()))
            .collect()
    }

    pub fn into_cart(self) -> Cart {
        self.cart
    }

    async fn persist(&self) {
        if let Err(e) = self.storage.save(self.cart.items()).await {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use proptest::prelude::*;

    use super::*;
    use crate::types::Price;

    #[derive(Default)]
    struct MemoryStorage {
        stored: Mutex<Option<Vec<CartItem>>>,
        saves: AtomicUsize,
        fail: bool,
    }

    impl MemoryStorage {
        fn with(items: Vec<CartItem>) -> Self {
            Self {
                stored: Mutex::new(Some(items)),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn stored(&self) -> Option<Vec<CartItem>> {
            self.stored.lock().unwrap().clone()
        }
    }

    impl CartStorage for &MemoryStorage {
        async fn load(&self) -> Result<Option<Vec<CartItem>>, StorageError> {
            if self.fail {
                return Err(StorageError::Malformed("not json".to_string()));
            }
            Ok(self.stored())
        }

        async fn save(&self, items: &[CartItem]) -> Result<(), StorageError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StorageError::Backend("quota exceeded".to_string()));
            }
            *self.stored.lock().unwrap() = Some(items.to_vec());
            Ok(())
        }
    }

    struct FixedCatalog(Option<Vec<Product>>);

    impl CatalogSource for FixedCatalog {
        async fn fetch(&self) -> Result<Vec<Product>, CatalogError> {
            self.0
                .clone()
                .ok_or_else(|| CatalogError::Unavailable("offline".to_string()))
        }
    }

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Part {id}"),
            description: String::new(),
            price: Price::new(price).unwrap(),
            images: vec![],
            sku: None,
            tags: vec![],
            oem: None,
            compatibility: None,
            condition: None,
            availability: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn snapshot(products: Vec<Product>) -> Arc<CatalogSnapshot> {
        Arc::new(CatalogSnapshot::new(products))
    }

    fn item(id: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            quantity,
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut cart = Cart::new();
        assert!(cart.add(ProductId::new("X")));
        assert!(!cart.add(ProductId::new("X")));
        assert_eq!(cart.items(), &[item("X", 1)]);
    }

    #[test]
    fn test_merge_keeps_session_items_and_appends_unseen() {
        let mut cart = Cart::from(vec![item("A", 2)]);
        let changed = cart.merge(vec![item("A", 5), item("B", 1), item("B", 3), item("C", 0)]);
        assert!(changed);
        assert_eq!(cart.items(), &[item("A", 2), item("B", 1)]);
        assert!(!cart.merge(vec![item("A", 1)]));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(&'static str),
        Remove(&'static str),
        Merge(Vec<(&'static str, u32)>),
    }

    const IDS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

    /// Catalog prices; `E` and `F` never resolve.
    const PRICES: [(&str, i64); 4] = [("A", 100), ("B", 50), ("C", 1250), ("D", 7)];

    fn op() -> impl Strategy<Value = Op> {
        let id = prop::sample::select(IDS.to_vec());
        prop_oneof![
            id.clone().prop_map(Op::Add),
            id.clone().prop_map(Op::Remove),
            prop::collection::vec((id, 0u32..5), 0..8).prop_map(Op::Merge),
        ]
    }

    fn expected_totals(cart: &Cart) -> CartTotals {
        cart.items()
            .iter()
            .filter_map(|item| {
                PRICES
                    .iter()
                    .find(|(id, _)| item.product_id.as_str() == *id)
                    .map(|(_, price)| (price * i64::from(item.quantity), item.quantity))
            })
            .fold(CartTotals::default(), |acc, (line, quantity)| CartTotals {
                total: acc.total + line,
                total_count: acc.total_count + quantity,
            })
    }

    proptest! {
        #[test]
        fn test_cart_invariants_hold_for_any_sequence(ops in prop::collection::vec(op(), 0..40)) {
            let catalog = CatalogSnapshot::new(
                PRICES.iter().map(|(id, price)| product(id, *price)).collect(),
            );
            let mut cart = Cart::new();

            for op in ops {
                match op {
                    Op::Add(id) => {
                        cart.add(ProductId::new(id));
                    }
                    Op::Remove(id) => {
                        cart.remove(&ProductId::new(id));
                    }
                    Op::Merge(items) => {
                        cart.merge(items.into_iter().map(|(id, q)| item(id, q)).collect());
                    }
                }

                let mut seen = HashSet::new();
                for item in cart.items() {
                    prop_assert!(seen.insert(item.product_id.clone()));
                    prop_assert!(item.quantity >= 1);
                }
                prop_assert_eq!(cart.totals(&catalog), expected_totals(&cart));
            }
        }
    }

    #[tokio::test]
    async fn test_missing_product_then_refresh() {
        let storage = MemoryStorage::default();
        let mut manager = CartManager::new(&storage, snapshot(vec![product("A", 100)]));

        manager.add(ProductId::new("A")).await;
        assert_eq!(
            manager.totals(),
            CartTotals {
                total: 100,
                total_count: 1
            }
        );

        manager.add(ProductId::new("B")).await;
        assert_eq!(
            manager.totals(),
            CartTotals {
                total: 100,
                total_count: 1
            }
        );
        assert_eq!(manager.resolved_lines().len(), 1);

        let source = FixedCatalog(Some(vec![product("A", 100), product("B", 50)]));
        assert!(manager.refresh_catalog(&source).await);
        assert_eq!(
            manager.totals(),
            CartTotals {
                total: 150,
                total_count: 2
            }
        );
    }

    #[tokio::test]
    async fn test_refresh_skipped_when_all_resolved() {
        let storage = MemoryStorage::default();
        let mut manager = CartManager::new(&storage, snapshot(vec![product("A", 100)]));
        manager.add(ProductId::new("A")).await;
        assert!(!manager.refresh_catalog(&FixedCatalog(Some(vec![]))).await);
        assert_eq!(manager.totals().total, 100);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot() {
        let storage = MemoryStorage::default();
        let mut manager = CartManager::new(&storage, snapshot(vec![product("A", 100)]));
        manager.add(ProductId::new("A")).await;
        manager.add(ProductId::new("B")).await;

        assert!(!manager.refresh_catalog(&FixedCatalog(None)).await);
        assert_eq!(manager.totals().total, 100);
        assert_eq!(manager.cart().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_last_item() {
        let storage = MemoryStorage::default();
        let mut manager = CartManager::new(&storage, snapshot(vec![product("X", 700)]));
        manager.add(ProductId::new("X")).await;
        assert!(manager.remove(&ProductId::new("X")).await);
        assert!(manager.cart().is_empty());
        assert_eq!(manager.totals(), CartTotals::default());
        assert_eq!(storage.stored(), Some(vec![]));
        assert!(!manager.remove(&ProductId::new("X")).await);
    }

    #[tokio::test]
    async fn test_mutations_persist_full_list() {
        let storage = MemoryStorage::default();
        let mut manager = CartManager::new(&storage, snapshot(vec![]));
        manager.add(ProductId::new("A")).await;
        manager.add(ProductId::new("B")).await;
        manager.add(ProductId::new("A")).await;
        assert_eq!(storage.saves.load(Ordering::SeqCst), 2);
        assert_eq!(storage.stored(), Some(vec![item("A", 1), item("B", 1)]));

        manager.clear().await;
        assert_eq!(storage.stored(), Some(vec![]));
    }

    #[tokio::test]
    async fn test_restore_merges_without_removing() {
        let storage = MemoryStorage::with(vec![item("B", 1), item("A", 4)]);
        let cart = Cart::from(vec![item("A", 1)]);
        let mut manager = CartManager::with_cart(cart, &storage, snapshot(vec![]));

        assert!(manager.restore().await);
        assert_eq!(manager.cart().items(), &[item("A", 1), item("B", 1)]);
        assert_eq!(storage.stored(), Some(vec![item("A", 1), item("B", 1)]));
    }

    #[tokio::test]
    async fn test_persistence_failures_are_swallowed() {
        let storage = MemoryStorage::failing();
        let mut manager = CartManager::new(&storage, snapshot(vec![product("A", 10)]));

        assert!(!manager.restore().await);
        assert!(manager.add(ProductId::new("A")).await);
        assert_eq!(manager.cart().len(), 1);
        assert_eq!(manager.totals().total, 10);
        assert_eq!(storage.saves.load(Ordering::SeqCst), 1);
    }
}
