//! Order placement and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog::LineRequest;
use common::{OrderId, UserId};
use orders::{CatalogClient, Order, OrderService, OrderStore};
use serde::Deserialize;

use crate::error::ApiError;

/// Shared order-service state accessible from all handlers.
pub struct OrdersState<C, O> {
    pub service: OrderService<C, O>,
}

/// Request body for `POST /orders`.
///
/// Token verification happens upstream; by the time a request lands here
/// the gateway has already resolved the user.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub items: Vec<LineRequest>,
}

/// POST /orders — place an order.
#[tracing::instrument(skip(state, req), fields(lines = req.items.len()))]
pub async fn create<C: CatalogClient + 'static, O: OrderStore + 'static>(
    State(state): State<Arc<OrdersState<C, O>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state.service.create_order(req.user_id, req.items).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders — list all orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<C: CatalogClient + 'static, O: OrderStore + 'static>(
    State(state): State<Arc<OrdersState<C, O>>>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state.service.list_orders().await?;
    Ok(Json(orders))
}

/// GET /orders/:id — load one order.
#[tracing::instrument(skip(state))]
pub async fn get<C: CatalogClient + 'static, O: OrderStore + 'static>(
    State(state): State<Arc<OrdersState<C, O>>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .service
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("order {id} not found")))?;

    Ok(Json(order))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("invalid order id: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
