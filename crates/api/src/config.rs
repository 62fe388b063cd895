//! Application configuration loaded from environment variables.

use std::time::Duration;

use resilience::BreakerConfig;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default per service)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults. `default_port` differs per service (catalog 3002,
    /// orders 3003).
    pub fn from_env(default_port: u16) -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(default_port),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Order-service configuration: server settings plus the catalog endpoint
/// and breaker tuning.
///
/// Additional environment variables:
/// - `CATALOG_URL` — base URL of the catalog service
///   (default: `"http://localhost:3002"`)
/// - `BREAKER_WINDOW_SIZE`, `BREAKER_FAILURE_RATIO`, `BREAKER_MIN_CALLS`
/// - `BREAKER_COOL_DOWN_MS`, `CATALOG_TIMEOUT_MS`
#[derive(Debug, Clone)]
pub struct OrdersConfig {
    pub server: Config,
    pub catalog_url: String,
    pub breaker: BreakerConfig,
}

impl OrdersConfig {
    /// Loads order-service configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = BreakerConfig::default();
        let breaker = BreakerConfig {
            window_size: env_parse("BREAKER_WINDOW_SIZE", defaults.window_size),
            failure_ratio: env_parse("BREAKER_FAILURE_RATIO", defaults.failure_ratio),
            min_calls: env_parse("BREAKER_MIN_CALLS", defaults.min_calls),
            cool_down: Duration::from_millis(env_parse(
                "BREAKER_COOL_DOWN_MS",
                defaults.cool_down.as_millis() as u64,
            )),
            call_timeout: Duration::from_millis(env_parse(
                "CATALOG_TIMEOUT_MS",
                defaults.call_timeout.as_millis() as u64,
            )),
        };

        Self {
            server: Config::from_env(3003),
            catalog_url: std::env::var("CATALOG_URL")
                .unwrap_or_else(|_| "http://localhost:3002".to_string()),
            breaker,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
