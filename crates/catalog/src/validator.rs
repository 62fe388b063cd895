//! Batch stock validation and reservation.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StockError};
use crate::store::{DecrementOutcome, InventoryStore};

/// One requested line of a validation batch: product and quantity only.
/// Prices are never accepted from callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl LineRequest {
    /// Creates a new line request.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A validated line with the catalog's authoritative price attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedLine {
    pub product_id: ProductId,
    pub name: String,
    /// Unit price at validation time, in cents.
    pub price: Money,
    pub quantity: u32,
    /// `price * quantity`, in cents.
    pub subtotal: Money,
}

/// Result of a successful batch validation and reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Sum of all line subtotals.
    pub total_price: Money,
    /// Validated lines, in request order, for audit and display.
    pub processed_items: Vec<ProcessedLine>,
}

/// Validates a batch of line requests against the inventory store and
/// reserves stock for all of them, or for none of them.
#[derive(Clone)]
pub struct StockValidator<S> {
    store: S,
}

impl<S: InventoryStore> StockValidator<S> {
    /// Creates a validator over the given inventory store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates every line and reserves stock for the whole batch.
    ///
    /// Two phases over the same call. The check phase looks up each product
    /// and prices the line; any missing product or short stock aborts with
    /// no mutation. The reserve phase then applies one atomic conditional
    /// decrement per line; if a concurrent batch drained stock between the
    /// phases, the decrement fails, every decrement already applied in this
    /// batch is restored, and the call fails with the availability observed
    /// at decrement time.
    #[tracing::instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn validate_and_reserve(&self, items: &[LineRequest]) -> Result<ValidationOutcome> {
        metrics::counter!("stock_validations_total").increment(1);

        if items.is_empty() {
            return Err(StockError::EmptyBatch);
        }

        // Check phase: price every line against current records. Reads may
        // go stale before the reserve phase; the decrement re-checks.
        let mut processed_items = Vec::with_capacity(items.len());
        let mut total_price = Money::zero();

        for line in items {
            if line.quantity == 0 {
                return Err(StockError::InvalidQuantity {
                    product_id: line.product_id.clone(),
                });
            }

            let product = self.store.get(&line.product_id).await?.ok_or_else(|| {
                StockError::NotFound {
                    product_id: line.product_id.clone(),
                }
            })?;

            if product.stock < line.quantity {
                return Err(StockError::Insufficient {
                    name: product.name,
                    available: product.stock,
                    requested: line.quantity,
                });
            }

            let subtotal = product.price.multiply(line.quantity);
            total_price += subtotal;
            processed_items.push(ProcessedLine {
                product_id: line.product_id.clone(),
                name: product.name,
                price: product.price,
                quantity: line.quantity,
                subtotal,
            });
        }

        // Reserve phase: one atomic decrement per line, all-or-nothing.
        for (index, line) in items.iter().enumerate() {
            let outcome = match self.store.try_decrement(&line.product_id, line.quantity).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.rollback(&items[..index]).await;
                    return Err(e.into());
                }
            };

            match outcome {
                DecrementOutcome::Applied => {}
                DecrementOutcome::NotFound => {
                    self.rollback(&items[..index]).await;
                    return Err(StockError::NotFound {
                        product_id: line.product_id.clone(),
                    });
                }
                DecrementOutcome::Insufficient { available } => {
                    self.rollback(&items[..index]).await;
                    metrics::counter!("stock_reservation_conflicts_total").increment(1);
                    tracing::debug!(
                        product_id = %line.product_id,
                        available,
                        requested = line.quantity,
                        "reservation lost race, batch rolled back"
                    );
                    return Err(StockError::Insufficient {
                        name: processed_items[index].name.clone(),
                        available,
                        requested: line.quantity,
                    });
                }
            }
        }

        metrics::counter!("stock_reservations_total").increment(1);
        Ok(ValidationOutcome {
            total_price,
            processed_items,
        })
    }

    /// Restores every line that was already decremented in this batch.
    async fn rollback(&self, reserved: &[LineRequest]) {
        for line in reserved.iter().rev() {
            if let Err(e) = self.store.restore(&line.product_id, line.quantity).await {
                tracing::error!(
                    product_id = %line.product_id,
                    quantity = line.quantity,
                    error = %e,
                    "failed to restore stock during batch rollback"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Product;
    use crate::store::InMemoryInventoryStore;

    async fn seeded_validator() -> StockValidator<InMemoryInventoryStore> {
        let store = InMemoryInventoryStore::new();
        store
            .upsert(Product::new("P1", "Widget", Money::from_cents(1000), 5))
            .await
            .unwrap();
        store
            .upsert(Product::new("P2", "Gadget", Money::from_cents(2500), 3))
            .await
            .unwrap();
        StockValidator::new(store)
    }

    async fn stock_of(validator: &StockValidator<InMemoryInventoryStore>, id: &str) -> u32 {
        validator
            .store()
            .get(&ProductId::new(id))
            .await
            .unwrap()
            .unwrap()
            .stock
    }

    #[tokio::test]
    async fn reserves_whole_batch_and_prices_it() {
        let validator = seeded_validator().await;

        let outcome = validator
            .validate_and_reserve(&[LineRequest::new("P1", 2), LineRequest::new("P2", 1)])
            .await
            .unwrap();

        assert_eq!(outcome.total_price.cents(), 2 * 1000 + 2500);
        assert_eq!(outcome.processed_items.len(), 2);
        assert_eq!(outcome.processed_items[0].name, "Widget");
        assert_eq!(outcome.processed_items[0].subtotal.cents(), 2000);
        assert_eq!(stock_of(&validator, "P1").await, 3);
        assert_eq!(stock_of(&validator, "P2").await, 2);
    }

    #[tokio::test]
    async fn unknown_product_aborts_with_no_mutation() {
        let validator = seeded_validator().await;

        let err = validator
            .validate_and_reserve(&[LineRequest::new("P1", 2), LineRequest::new("ghost", 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, StockError::NotFound { ref product_id } if product_id.as_str() == "ghost"));
        assert_eq!(stock_of(&validator, "P1").await, 5);
    }

    #[tokio::test]
    async fn short_stock_aborts_with_no_mutation() {
        let validator = seeded_validator().await;

        let err = validator
            .validate_and_reserve(&[LineRequest::new("P1", 2), LineRequest::new("P2", 4)])
            .await
            .unwrap_err();

        match err {
            StockError::Insufficient {
                name,
                available,
                requested,
            } => {
                assert_eq!(name, "Gadget");
                assert_eq!(available, 3);
                assert_eq!(requested, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stock_of(&validator, "P1").await, 5);
        assert_eq!(stock_of(&validator, "P2").await, 3);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let validator = seeded_validator().await;
        let err = validator.validate_and_reserve(&[]).await.unwrap_err();
        assert!(matches!(err, StockError::EmptyBatch));
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let validator = seeded_validator().await;
        let err = validator
            .validate_and_reserve(&[LineRequest::new("P1", 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::InvalidQuantity { .. }));
        assert_eq!(stock_of(&validator, "P1").await, 5);
    }

    #[tokio::test]
    async fn duplicate_lines_over_stock_roll_back() {
        let validator = seeded_validator().await;

        // Each duplicate line passes the check against its own read, but
        // the second atomic decrement comes up short and unwinds the first.
        let err = validator
            .validate_and_reserve(&[LineRequest::new("P1", 3), LineRequest::new("P1", 3)])
            .await
            .unwrap_err();

        assert!(matches!(err, StockError::Insufficient { available: 2, .. }));
        assert_eq!(stock_of(&validator, "P1").await, 5);
    }

    #[tokio::test]
    async fn line_prices_come_from_the_store() {
        let validator = seeded_validator().await;

        let outcome = validator
            .validate_and_reserve(&[LineRequest::new("P2", 2)])
            .await
            .unwrap();

        assert_eq!(outcome.processed_items[0].price.cents(), 2500);
        assert_eq!(outcome.total_price.cents(), 5000);
    }
}
