//! HTTP surfaces for the catalog and order services.
//!
//! Two routers are built here: the catalog API (inventory authority) and
//! the orders API (placement orchestrator). Both carry structured request
//! tracing and a Prometheus scrape endpoint.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use catalog::InventoryStore;
use metrics_exporter_prometheus::PrometheusHandle;
use orders::{CatalogClient, OrderStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::orders::OrdersState;
pub use routes::products::CatalogState;

fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(handle)
}

/// Builds the catalog service router.
pub fn catalog_app<S: InventoryStore + 'static>(
    state: Arc<CatalogState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/products",
            get(routes::products::list::<S>).post(routes::products::create::<S>),
        )
        .route(
            "/products/validate",
            axum::routing::post(routes::products::validate::<S>),
        )
        .route("/products/{id}", get(routes::products::get::<S>))
        .with_state(state)
        .merge(metrics_router(metrics_handle))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds the order service router.
pub fn orders_app<C: CatalogClient + 'static, O: OrderStore + 'static>(
    state: Arc<OrdersState<C, O>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/orders",
            get(routes::orders::list::<C, O>).post(routes::orders::create::<C, O>),
        )
        .route("/orders/{id}", get(routes::orders::get::<C, O>))
        .with_state(state)
        .merge(metrics_router(metrics_handle))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Resolves when the process receives SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
