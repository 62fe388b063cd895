//! Shared value types used across the catalog and order services.

mod money;
mod types;

pub use money::Money;
pub use types::{OrderId, ProductId, UserId};
