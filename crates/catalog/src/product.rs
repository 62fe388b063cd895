//! Product records owned by the inventory store.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A catalog product with its authoritative price and stock count.
///
/// Stock is unsigned: non-negativity holds by construction, and the only
/// mutation path is the store's conditional decrement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Opaque catalog key.
    pub id: ProductId,
    /// Human-readable product name.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Unit price. Authoritative; never taken from callers.
    pub price: Money,
    /// Units available for reservation.
    pub stock: u32,
}

impl Product {
    /// Creates a new product.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
        stock: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            price,
            stock,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
