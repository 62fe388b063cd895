//! Order service error taxonomy.

use catalog::contract::StockRejection;
use thiserror::Error;

/// Errors surfaced by the order orchestrator.
///
/// Every failure maps into one of these four kinds at the service
/// boundary; nothing is swallowed and nothing is retried in-line.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Malformed request shape. Local and immediate; no network call made.
    #[error("invalid order request: {0}")]
    Validation(String),

    /// The catalog rejected the batch (unknown product or short stock).
    /// Carries the underlying rejection detail.
    #[error("stock unavailable: {0}")]
    StockUnavailable(StockRejection),

    /// The catalog is unreachable, timed out, or the breaker is open.
    #[error("catalog service temporarily unavailable")]
    CatalogUnavailable,

    /// Persistence failure in the order store.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for order service results.
pub type Result<T> = std::result::Result<T, OrderError>;
