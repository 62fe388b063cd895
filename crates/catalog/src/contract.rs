//! Wire contract for the catalog HTTP boundary.
//!
//! These types are shared by the catalog server and the order service's
//! HTTP client so both sides agree on the JSON shapes. Monetary fields are
//! integer cents.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::StockError;
use crate::product::Product;
use crate::validator::{LineRequest, ProcessedLine, ValidationOutcome};

/// Request body for `POST /products/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateStockRequest {
    pub items: Vec<LineRequest>,
}

/// Success body for `POST /products/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateStockResponse {
    pub valid: bool,
    pub total_price: Money,
    pub processed_items: Vec<ProcessedLine>,
}

impl From<ValidationOutcome> for ValidateStockResponse {
    fn from(outcome: ValidationOutcome) -> Self {
        Self {
            valid: true,
            total_price: outcome.total_price,
            processed_items: outcome.processed_items,
        }
    }
}

impl From<ValidateStockResponse> for ValidationOutcome {
    fn from(response: ValidateStockResponse) -> Self {
        Self {
            total_price: response.total_price,
            processed_items: response.processed_items,
        }
    }
}

/// Tagged rejection body for validation failures.
///
/// Serialized as `{"kind": "...", ...}` so callers branch on the tag
/// instead of sniffing message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StockRejection {
    /// A requested product does not exist in the catalog.
    #[error("product {product_id} not found in catalog")]
    #[serde(rename_all = "camelCase")]
    ProductNotFound { product_id: ProductId },

    /// A product exists but does not have enough stock.
    #[error("insufficient stock for \"{name}\": available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: u32,
        requested: u32,
    },

    /// The batch contained no lines.
    #[error("validation batch is empty")]
    EmptyBatch,

    /// A line requested a non-positive quantity.
    #[error("invalid quantity for product {product_id}: must be greater than zero")]
    #[serde(rename_all = "camelCase")]
    InvalidQuantity { product_id: ProductId },
}

impl StockRejection {
    /// Extracts the wire rejection from a validation error, if it is a
    /// domain rejection rather than an internal store failure.
    pub fn from_error(err: &StockError) -> Option<Self> {
        match err {
            StockError::NotFound { product_id } => Some(Self::ProductNotFound {
                product_id: product_id.clone(),
            }),
            StockError::Insufficient {
                name,
                available,
                requested,
            } => Some(Self::InsufficientStock {
                name: name.clone(),
                available: *available,
                requested: *requested,
            }),
            StockError::EmptyBatch => Some(Self::EmptyBatch),
            StockError::InvalidQuantity { product_id } => Some(Self::InvalidQuantity {
                product_id: product_id.clone(),
            }),
            StockError::Store(_) => None,
        }
    }

    /// True for the two rejections caused by batch shape rather than
    /// catalog state.
    pub fn is_malformed_batch(&self) -> bool {
        matches!(self, Self::EmptyBatch | Self::InvalidQuantity { .. })
    }
}

/// Request body for `POST /products`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price in cents.
    pub price: Money,
    pub stock: u32,
}

/// Product representation returned by the catalog API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock: u32,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
        }
    }
}
