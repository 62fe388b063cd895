//! Order orchestration for the order placement system.
//!
//! The orchestrator accepts a user and a list of requested lines, reserves
//! stock through the catalog service behind a circuit breaker, and persists
//! the resulting order. Prices always come from the catalog; the orchestrator
//! never trusts amounts supplied by callers.

pub mod client;
pub mod error;
pub mod order;
pub mod service;
pub mod store;

pub use client::{CatalogClient, CatalogError, HttpCatalogClient, LocalCatalogClient};
pub use error::OrderError;
pub use order::{Order, OrderStatus};
pub use service::OrderService;
pub use store::{InMemoryOrderStore, OrderStore};
