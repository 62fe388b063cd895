//! Order service entry point: placement orchestrator on port 3003.

use std::sync::Arc;

use api::config::OrdersConfig;
use api::routes::orders::OrdersState;
use orders::{HttpCatalogClient, InMemoryOrderStore, OrderService};
use resilience::CircuitBreaker;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    let config = OrdersConfig::from_env();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    let catalog = HttpCatalogClient::new(&config.catalog_url);
    let breaker = CircuitBreaker::new(config.breaker.clone());
    let state = Arc::new(OrdersState {
        service: OrderService::new(catalog, InMemoryOrderStore::new(), breaker),
    });

    let app = api::orders_app(state, metrics_handle);

    let addr = config.server.addr();
    tracing::info!(%addr, catalog_url = %config.catalog_url, "starting order service");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(api::shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("order service shut down gracefully");
}
