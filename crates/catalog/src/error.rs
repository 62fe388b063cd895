//! Catalog error types.

use common::ProductId;
use thiserror::Error;

/// Errors from the inventory store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not serve the request.
    #[error("inventory store failure: {0}")]
    Backend(String),
}

/// Errors from batch stock validation.
///
/// The first four variants are domain rejections: the catalog was reached
/// and answered, the request just cannot be satisfied. `Store` is an
/// internal failure of the inventory backend.
#[derive(Debug, Error)]
pub enum StockError {
    /// A requested product does not exist in the catalog.
    #[error("product {product_id} not found in catalog")]
    NotFound { product_id: ProductId },

    /// A product exists but does not have enough stock.
    #[error("insufficient stock for \"{name}\": available {available}, requested {requested}")]
    Insufficient {
        name: String,
        available: u32,
        requested: u32,
    },

    /// The validation batch contained no lines.
    #[error("validation batch is empty")]
    EmptyBatch,

    /// A line requested a non-positive quantity.
    #[error("invalid quantity for product {product_id}: must be greater than zero")]
    InvalidQuantity { product_id: ProductId },

    /// Inventory store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StockError {
    /// Returns true for domain rejections, false for internal failures.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, StockError::Store(_))
    }
}

/// Convenience type alias for catalog results.
pub type Result<T> = std::result::Result<T, StockError>;
