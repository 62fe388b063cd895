//! Inventory authority for the order placement system.
//!
//! This crate owns product records (name, price, stock) and exposes the
//! batch "validate and reserve" operation the order orchestrator calls at
//! placement time. Stock is only ever mutated through the store's atomic
//! conditional decrement, so it can never go negative, and a batch either
//! reserves every line or reserves nothing.

pub mod contract;
pub mod error;
pub mod product;
pub mod store;
pub mod validator;

pub use error::{StockError, StoreError};
pub use product::Product;
pub use store::{DecrementOutcome, InMemoryInventoryStore, InventoryStore};
pub use validator::{LineRequest, ProcessedLine, StockValidator, ValidationOutcome};
