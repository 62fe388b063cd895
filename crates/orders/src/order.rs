//! Order records owned by the order service.

use catalog::LineRequest;
use chrono::{DateTime, Utc};
use common::{Money, OrderId, UserId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an order. Creation always starts at `Pending`;
/// later transitions belong to fulfillment, not to placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Completed => write!(f, "COMPLETED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// A persisted purchase order.
///
/// `items` keeps the original productId/quantity pairs; `total_amount` is
/// the catalog-computed total at validation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<LineRequest>,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new pending order stamped with the current time.
    pub fn new(user_id: UserId, items: Vec<LineRequest>, total_amount: Money) -> Self {
        Self {
            id: OrderId::new(),
            user_id,
            items,
            total_amount,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_orders_start_pending() {
        let order = Order::new(
            UserId::new(),
            vec![LineRequest::new("P1", 2)],
            Money::from_cents(2000),
        );
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount.cents(), 2000);
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");
    }

    #[test]
    fn order_serializes_camel_case() {
        let order = Order::new(UserId::new(), vec![LineRequest::new("P1", 1)], Money::zero());
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("totalAmount").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["items"][0]["productId"], "P1");
    }
}
