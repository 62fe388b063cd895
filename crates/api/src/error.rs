//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog::StockError;
use catalog::contract::StockRejection;
use orders::OrderError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Stock rejection from batch validation; serialized as the tagged
    /// contract body so clients can reconstruct the typed error.
    Stock(StockRejection),
    /// Dependency unreachable or breaker open.
    Unavailable(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Stock(rejection) => {
                let status = if rejection.is_malformed_batch() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::CONFLICT
                };
                let mut body =
                    serde_json::to_value(&rejection).unwrap_or_else(|_| serde_json::json!({}));
                body["message"] = serde_json::Value::String(rejection.to_string());
                (status, axum::Json(body)).into_response()
            }
            ApiError::NotFound(msg) => error_body(StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => error_body(StatusCode::BAD_REQUEST, msg),
            ApiError::Unavailable(msg) => error_body(StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        }
    }
}

fn error_body(status: StatusCode, message: String) -> Response {
    let body = serde_json::json!({ "message": message });
    (status, axum::Json(body)).into_response()
}

impl From<StockError> for ApiError {
    fn from(err: StockError) -> Self {
        match StockRejection::from_error(&err) {
            Some(rejection) => ApiError::Stock(rejection),
            None => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation(msg) => ApiError::BadRequest(msg),
            OrderError::StockUnavailable(rejection) => ApiError::Stock(rejection),
            OrderError::CatalogUnavailable => ApiError::Unavailable(err.to_string()),
            OrderError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}
