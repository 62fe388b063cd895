//! Order store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::order::Order;

/// Errors from the order store backend.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    /// The backing store could not serve the request.
    #[error("order store failure: {0}")]
    Backend(String),
}

/// Durable mapping from order id to order record.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order.
    async fn insert(&self, order: Order) -> Result<(), OrderStoreError>;

    /// Returns the order stored under `id`, if any.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderStoreError>;

    /// Returns all orders, newest first.
    async fn list(&self) -> Result<Vec<Order>, OrderStoreError>;
}

/// In-memory order store.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<(), OrderStoreError> {
        self.orders.write().await.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderStoreError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>, OrderStoreError> {
        let mut orders: Vec<Order> = self.orders.read().await.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::LineRequest;
    use common::{Money, UserId};

    fn order(cents: i64) -> Order {
        Order::new(
            UserId::new(),
            vec![LineRequest::new("P1", 1)],
            Money::from_cents(cents),
        )
    }

    #[tokio::test]
    async fn insert_and_get() {
        let store = InMemoryOrderStore::new();
        let order = order(1000);
        let id = order.id;

        store.insert(order.clone()).await.unwrap();
        assert_eq!(store.get(id).await.unwrap(), Some(order));
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = InMemoryOrderStore::new();
        assert!(store.get(OrderId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let store = InMemoryOrderStore::new();

        let mut first = order(100);
        let mut second = order(200);
        // Force distinct, ordered timestamps.
        first.created_at = chrono::Utc::now() - chrono::Duration::seconds(10);
        second.created_at = chrono::Utc::now();

        store.insert(first.clone()).await.unwrap();
        store.insert(second.clone()).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }
}
