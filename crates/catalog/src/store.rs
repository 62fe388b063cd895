//! Inventory store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use common::ProductId;

use crate::error::StoreError;
use crate::product::Product;

/// Result of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecrementOutcome {
    /// Stock was decremented by the requested quantity.
    Applied,
    /// No product exists under the given key.
    NotFound,
    /// The product exists but holds fewer units than requested.
    Insufficient {
        /// Units available at decrement time.
        available: u32,
    },
}

/// Durable mapping from product id to product record.
///
/// Stock mutation goes exclusively through [`try_decrement`] (and its
/// compensating [`restore`]); no caller may read-then-write stock across
/// two separate operations.
///
/// [`try_decrement`]: InventoryStore::try_decrement
/// [`restore`]: InventoryStore::restore
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Returns the product stored under `id`, if any.
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Inserts or replaces a product record.
    async fn upsert(&self, product: Product) -> Result<(), StoreError>;

    /// Returns all products.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    /// Atomically decrements stock by `quantity` if at least `quantity`
    /// units are available.
    async fn try_decrement(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<DecrementOutcome, StoreError>;

    /// Adds `quantity` units back. Compensation path for aborted batches.
    async fn restore(&self, id: &ProductId, quantity: u32) -> Result<(), StoreError>;
}

/// In-memory inventory store with per-product locking.
///
/// The outer lock guards only the map shape; each product sits behind its
/// own mutex, so concurrent decrements of the same product serialize while
/// decrements of disjoint products proceed in parallel. Critical sections
/// never hold a lock across an await point.
#[derive(Clone, Default)]
pub struct InMemoryInventoryStore {
    products: Arc<RwLock<HashMap<ProductId, Arc<Mutex<Product>>>>>,
}

impl InMemoryInventoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of distinct products.
    pub fn product_count(&self) -> usize {
        self.products.read().unwrap().len()
    }

    fn slot(&self, id: &ProductId) -> Option<Arc<Mutex<Product>>> {
        self.products.read().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.slot(id).map(|slot| slot.lock().unwrap().clone()))
    }

    async fn upsert(&self, product: Product) -> Result<(), StoreError> {
        let mut map = self.products.write().unwrap();
        match map.get(&product.id) {
            Some(slot) => *slot.lock().unwrap() = product,
            None => {
                map.insert(product.id.clone(), Arc::new(Mutex::new(product)));
            }
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let map = self.products.read().unwrap();
        let mut products: Vec<Product> = map
            .values()
            .map(|slot| slot.lock().unwrap().clone())
            .collect();
        products.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(products)
    }

    async fn try_decrement(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<DecrementOutcome, StoreError> {
        let Some(slot) = self.slot(id) else {
            return Ok(DecrementOutcome::NotFound);
        };

        let mut product = slot.lock().unwrap();
        if product.stock >= quantity {
            product.stock -= quantity;
            Ok(DecrementOutcome::Applied)
        } else {
            Ok(DecrementOutcome::Insufficient {
                available: product.stock,
            })
        }
    }

    async fn restore(&self, id: &ProductId, quantity: u32) -> Result<(), StoreError> {
        let Some(slot) = self.slot(id) else {
            // Restores only follow a successful decrement; a missing key
            // means the product was deleted mid-batch, nothing to undo.
            return Ok(());
        };
        let mut product = slot.lock().unwrap();
        product.stock = product.stock.saturating_add(quantity);
        Ok(())
    }
}
