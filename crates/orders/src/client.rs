//! Catalog client: the orchestrator's view of the inventory authority.

use async_trait::async_trait;
use catalog::contract::{StockRejection, ValidateStockRequest, ValidateStockResponse};
use catalog::{InventoryStore, LineRequest, StockError, StockValidator, ValidationOutcome};
use reqwest::StatusCode;
use resilience::FailureClass;
use thiserror::Error;

/// Errors from a catalog call, split by what they mean for breaker health.
///
/// `Rejected` is a successful call carrying a business failure; only the
/// transport-level variants feed the circuit breaker.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog answered and rejected the batch.
    #[error(transparent)]
    Rejected(#[from] StockRejection),

    /// The catalog could not be reached, or the connection broke.
    #[error("catalog transport failure: {0}")]
    Transport(String),

    /// The catalog answered outside its contract (5xx, unparseable body).
    #[error("unexpected catalog response: {0}")]
    Protocol(String),
}

impl FailureClass for CatalogError {
    fn is_transport(&self) -> bool {
        matches!(self, CatalogError::Transport(_) | CatalogError::Protocol(_))
    }
}

/// Batch stock validation as seen from the order orchestrator.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Validates every line and reserves stock for the whole batch.
    async fn validate_and_reserve(
        &self,
        items: &[LineRequest],
    ) -> Result<ValidationOutcome, CatalogError>;
}

/// HTTP client against the catalog service's `POST /products/validate`.
///
/// Carries no timeout of its own: the circuit breaker owns cancellation.
#[derive(Clone)]
pub struct HttpCatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// Creates a client for the catalog service at `base_url`
    /// (e.g. `http://localhost:3002`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn validate_and_reserve(
        &self,
        items: &[LineRequest],
    ) -> Result<ValidationOutcome, CatalogError> {
        let request = ValidateStockRequest {
            items: items.to_vec(),
        };

        let response = self
            .http
            .post(format!("{}/products/validate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let body: ValidateStockResponse = response
                    .json()
                    .await
                    .map_err(|e| CatalogError::Protocol(e.to_string()))?;
                Ok(body.into())
            }
            StatusCode::CONFLICT | StatusCode::BAD_REQUEST => {
                let rejection: StockRejection = response
                    .json()
                    .await
                    .map_err(|e| CatalogError::Protocol(e.to_string()))?;
                Err(CatalogError::Rejected(rejection))
            }
            status => Err(CatalogError::Protocol(format!(
                "unexpected status {status}"
            ))),
        }
    }
}

/// In-process client wrapping a [`StockValidator`] directly.
///
/// Used by tests and single-process deployments where the catalog lives in
/// the same binary; the error surface is identical to the HTTP client's.
#[derive(Clone)]
pub struct LocalCatalogClient<S> {
    validator: StockValidator<S>,
}

impl<S: InventoryStore> LocalCatalogClient<S> {
    /// Creates a client over the given validator.
    pub fn new(validator: StockValidator<S>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl<S: InventoryStore> CatalogClient for LocalCatalogClient<S> {
    async fn validate_and_reserve(
        &self,
        items: &[LineRequest],
    ) -> Result<ValidationOutcome, CatalogError> {
        self.validator
            .validate_and_reserve(items)
            .await
            .map_err(|e| match StockRejection::from_error(&e) {
                Some(rejection) => CatalogError::Rejected(rejection),
                None => match e {
                    StockError::Store(store_err) => CatalogError::Protocol(store_err.to_string()),
                    other => CatalogError::Protocol(other.to_string()),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{InMemoryInventoryStore, Product};
    use common::Money;

    async fn local_client() -> LocalCatalogClient<InMemoryInventoryStore> {
        let store = InMemoryInventoryStore::new();
        store
            .upsert(Product::new("P1", "Widget", Money::from_cents(1000), 5))
            .await
            .unwrap();
        LocalCatalogClient::new(StockValidator::new(store))
    }

    #[tokio::test]
    async fn local_client_reserves_stock() {
        let client = local_client().await;
        let outcome = client
            .validate_and_reserve(&[LineRequest::new("P1", 2)])
            .await
            .unwrap();
        assert_eq!(outcome.total_price.cents(), 2000);
    }

    #[tokio::test]
    async fn local_client_maps_rejections() {
        let client = local_client().await;
        let err = client
            .validate_and_reserve(&[LineRequest::new("P1", 9)])
            .await
            .unwrap_err();

        assert!(!err.is_transport());
        assert!(matches!(
            err,
            CatalogError::Rejected(StockRejection::InsufficientStock {
                available: 5,
                requested: 9,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn transport_errors_classify_as_breaker_failures() {
        assert!(CatalogError::Transport("refused".into()).is_transport());
        assert!(CatalogError::Protocol("500".into()).is_transport());
        assert!(
            !CatalogError::Rejected(StockRejection::EmptyBatch).is_transport()
        );
    }

    #[tokio::test]
    async fn http_client_reports_transport_failure_when_unreachable() {
        // Nothing listens on this port.
        let client = HttpCatalogClient::new("http://127.0.0.1:9");
        let err = client
            .validate_and_reserve(&[LineRequest::new("P1", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
    }
}
