//! The order orchestrator.

use catalog::LineRequest;
use common::{OrderId, UserId};
use resilience::{BreakerError, CircuitBreaker};

use crate::client::{CatalogClient, CatalogError};
use crate::error::{OrderError, Result};
use crate::order::Order;
use crate::store::OrderStore;

/// Coordinates order placement: local validation, stock reservation
/// through the circuit-breaker-guarded catalog call, and persistence.
///
/// The breaker is the process-wide shared instance; resilience is entirely
/// delegated to its fail-fast and half-open probing, so a single
/// `create_order` call never retries.
pub struct OrderService<C, O> {
    catalog: C,
    orders: O,
    breaker: CircuitBreaker,
}

impl<C, O> OrderService<C, O>
where
    C: CatalogClient,
    O: OrderStore,
{
    /// Creates a new order service.
    pub fn new(catalog: C, orders: O, breaker: CircuitBreaker) -> Self {
        Self {
            catalog,
            orders,
            breaker,
        }
    }

    /// Returns the shared breaker guarding catalog calls.
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Places an order for `user_id`.
    ///
    /// The catalog's reservation is the price authority: `total_amount` is
    /// whatever the validator computed, never a caller-supplied figure.
    #[tracing::instrument(skip(self, items), fields(%user_id, lines = items.len()))]
    pub async fn create_order(&self, user_id: UserId, items: Vec<LineRequest>) -> Result<Order> {
        metrics::counter!("orders_requested_total").increment(1);

        if items.is_empty() {
            return Err(OrderError::Validation("order contains no items".to_string()));
        }
        if let Some(line) = items.iter().find(|line| line.quantity == 0) {
            return Err(OrderError::Validation(format!(
                "quantity for product {} must be greater than zero",
                line.product_id
            )));
        }

        let outcome = match self
            .breaker
            .call(|| self.catalog.validate_and_reserve(&items))
            .await
        {
            Ok(outcome) => outcome,
            Err(BreakerError::Rejected) => {
                metrics::counter!("orders_rejected_breaker_total").increment(1);
                tracing::warn!("catalog call rejected, breaker open");
                return Err(OrderError::CatalogUnavailable);
            }
            Err(BreakerError::Timeout(timeout)) => {
                tracing::warn!(?timeout, "catalog call timed out");
                return Err(OrderError::CatalogUnavailable);
            }
            Err(BreakerError::Inner(CatalogError::Rejected(rejection))) => {
                if rejection.is_malformed_batch() {
                    // The local guard should have caught these; treat a
                    // remote echo of them the same way.
                    return Err(OrderError::Validation(rejection.to_string()));
                }
                tracing::info!(%rejection, "catalog rejected the batch");
                return Err(OrderError::StockUnavailable(rejection));
            }
            Err(BreakerError::Inner(transport)) => {
                tracing::warn!(error = %transport, "catalog transport failure");
                return Err(OrderError::CatalogUnavailable);
            }
        };

        let order = Order::new(user_id, items, outcome.total_price);
        self.orders
            .insert(order.clone())
            .await
            .map_err(|e| OrderError::Internal(e.to_string()))?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(
            order_id = %order.id,
            total = %order.total_amount,
            "order created"
        );
        Ok(order)
    }

    /// Loads an order by id.
    pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        self.orders
            .get(id)
            .await
            .map_err(|e| OrderError::Internal(e.to_string()))
    }

    /// Lists all orders, newest first.
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        self.orders
            .list()
            .await
            .map_err(|e| OrderError::Internal(e.to_string()))
    }
}
