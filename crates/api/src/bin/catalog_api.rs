//! Catalog service entry point: inventory authority on port 3002.

use std::sync::Arc;

use api::config::Config;
use api::routes::products::CatalogState;
use catalog::{InMemoryInventoryStore, StockValidator};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    let config = Config::from_env(3002);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    let store = InMemoryInventoryStore::new();
    let state = Arc::new(CatalogState {
        validator: StockValidator::new(store),
    });

    let app = api::catalog_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting catalog service");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(api::shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("catalog service shut down gracefully");
}
