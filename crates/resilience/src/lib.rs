//! Resilience primitives for calls to unreliable dependencies.
//!
//! The one primitive here is the circuit breaker guarding the order
//! orchestrator's calls to the catalog service: fail fast when the
//! dependency is known to be unhealthy instead of queuing load against it.

pub mod circuit_breaker;

pub use circuit_breaker::{
    BreakerConfig, BreakerError, BreakerMetrics, CircuitBreaker, FailureClass, Phase,
};
