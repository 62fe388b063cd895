//! Catalog endpoints: product CRUD and batch stock validation.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog::contract::{
    CreateProductRequest, ProductResponse, ValidateStockRequest, ValidateStockResponse,
};
use catalog::{InventoryStore, Product, StockValidator};
use common::ProductId;

use crate::error::ApiError;

/// Shared catalog state accessible from all handlers.
pub struct CatalogState<S> {
    pub validator: StockValidator<S>,
}

/// GET /products — list the whole catalog.
#[tracing::instrument(skip(state))]
pub async fn list<S: InventoryStore + 'static>(
    State(state): State<Arc<CatalogState<S>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state
        .validator
        .store()
        .list()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// POST /products — create a product with a generated id.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: InventoryStore + 'static>(
    State(state): State<Arc<CatalogState<S>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("product name is required".to_string()));
    }
    if req.price.is_negative() {
        return Err(ApiError::BadRequest(
            "product price must not be negative".to_string(),
        ));
    }

    let mut product = Product::new(
        uuid::Uuid::new_v4().to_string(),
        req.name,
        req.price,
        req.stock,
    );
    product.description = req.description;

    state
        .validator
        .store()
        .upsert(product.clone())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// GET /products/:id — look up one product.
#[tracing::instrument(skip(state))]
pub async fn get<S: InventoryStore + 'static>(
    State(state): State<Arc<CatalogState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .validator
        .store()
        .get(&ProductId::new(id.as_str()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("product {id} not found")))?;

    Ok(Json(product.into()))
}

/// POST /products/validate — validate and reserve a batch of lines.
///
/// The boundary the order service calls. Domain rejections return 409
/// (400 for malformed batches) with the tagged contract body.
#[tracing::instrument(skip(state, req), fields(lines = req.items.len()))]
pub async fn validate<S: InventoryStore + 'static>(
    State(state): State<Arc<CatalogState<S>>>,
    Json(req): Json<ValidateStockRequest>,
) -> Result<Json<ValidateStockResponse>, ApiError> {
    let outcome = state.validator.validate_and_reserve(&req.items).await?;
    Ok(Json(outcome.into()))
}
