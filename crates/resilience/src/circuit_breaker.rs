//! Circuit breaker with a rolling outcome window and single-flight probing.
//!
//! # States
//!
//! - **Closed**: calls pass through under a bounded timeout. Completed
//!   calls are recorded into a trailing window; when the failure ratio in
//!   the window crosses the configured threshold, the breaker opens.
//! - **Open**: calls are rejected immediately, without invoking the
//!   dependency, until the cool-down elapses.
//! - **HalfOpen**: exactly one trial call probes the dependency; every
//!   other caller is rejected while the trial is in flight. Trial success
//!   closes breaker and resets the window; trial failure reopens it.
//!
//! Only transport-level outcomes (timeout, connection failure, unexpected
//! server error) count toward the failure ratio. Domain rejections are
//! successful calls that happen to carry a business failure; counting them
//! would trip the breaker under ordinary demand spikes. The wrapped error
//! type declares which is which through [`FailureClass`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Classifies errors for breaker-health purposes.
pub trait FailureClass {
    /// True when the error is a transport-level outcome (connection
    /// refused/reset, unexpected server error) that should count as a
    /// breaker failure. Domain rejections return false.
    fn is_transport(&self) -> bool;
}

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Number of recent call outcomes kept in the rolling window.
    pub window_size: usize,
    /// Failure ratio above which the breaker opens.
    pub failure_ratio: f64,
    /// Minimum recorded calls before the ratio is evaluated.
    pub min_calls: usize,
    /// How long the breaker stays open before allowing a trial call.
    pub cool_down: Duration,
    /// Timeout applied to every guarded call.
    pub call_timeout: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            failure_ratio: 0.5,
            min_calls: 3,
            cool_down: Duration::from_secs(10),
            call_timeout: Duration::from_secs(3),
        }
    }
}

impl BreakerConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> BreakerConfigBuilder {
        BreakerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BreakerConfig`].
#[derive(Debug, Clone)]
pub struct BreakerConfigBuilder {
    config: BreakerConfig,
}

impl BreakerConfigBuilder {
    /// Set the rolling window size.
    #[must_use]
    pub fn window_size(mut self, size: usize) -> Self {
        self.config.window_size = size;
        self
    }

    /// Set the failure ratio that opens the breaker.
    #[must_use]
    pub fn failure_ratio(mut self, ratio: f64) -> Self {
        self.config.failure_ratio = ratio;
        self
    }

    /// Set the minimum number of recorded calls before the ratio applies.
    #[must_use]
    pub fn min_calls(mut self, min: usize) -> Self {
        self.config.min_calls = min;
        self
    }

    /// Set the open-state cool-down.
    #[must_use]
    pub fn cool_down(mut self, cool_down: Duration) -> Self {
        self.config.cool_down = cool_down;
        self
    }

    /// Set the per-call timeout.
    #[must_use]
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.config.call_timeout = timeout;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> BreakerConfig {
        self.config
    }
}

/// Breaker phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Calls pass through normally.
    Closed,
    /// Calls are rejected immediately.
    Open,
    /// A single trial call is probing the dependency.
    HalfOpen,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Closed => write!(f, "closed"),
            Phase::Open => write!(f, "open"),
            Phase::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Errors from guarded calls.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The breaker is open; the dependency was not invoked.
    #[error("circuit breaker is open")]
    Rejected,
    /// The call exceeded the configured timeout.
    #[error("call timed out after {0:?}")]
    Timeout(Duration),
    /// The wrapped operation failed.
    #[error("{0}")]
    Inner(E),
}

#[derive(Debug)]
struct BreakerState {
    phase: Phase,
    /// Rolling record of completed calls; `true` marks success.
    window: VecDeque<bool>,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

enum Admission {
    /// Proceed as a regular closed-phase call.
    Normal,
    /// Proceed as the single half-open trial.
    Trial,
    /// Reject without invoking the dependency.
    Rejected,
}

/// Process-wide circuit breaker shared by every orchestrator call.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CircuitBreaker {
    config: Arc<BreakerConfig>,
    state: Arc<Mutex<BreakerState>>,
    total_calls: Arc<AtomicU64>,
    total_failures: Arc<AtomicU64>,
    total_rejections: Arc<AtomicU64>,
}

impl CircuitBreaker {
    /// Create a new breaker in the closed phase.
    #[must_use]
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(BreakerState {
                phase: Phase::Closed,
                window: VecDeque::new(),
                opened_at: None,
                trial_in_flight: false,
            })),
            total_calls: Arc::new(AtomicU64::new(0)),
            total_failures: Arc::new(AtomicU64::new(0)),
            total_rejections: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.state.lock().unwrap().phase
    }

    /// Run an operation through the breaker.
    ///
    /// The operation runs under the configured timeout. A timeout or an
    /// error whose [`FailureClass::is_transport`] is true is recorded as a
    /// breaker failure; success and domain rejections are recorded as
    /// successful calls.
    ///
    /// # Errors
    ///
    /// [`BreakerError::Rejected`] when the breaker refuses the call,
    /// [`BreakerError::Timeout`] when the operation outlives the timeout,
    /// [`BreakerError::Inner`] when the operation itself fails.
    pub async fn call<F, Fut, T, E>(&self, op: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: FailureClass,
    {
        self.total_calls.fetch_add(1, Ordering::Relaxed);

        let trial = match self.try_admit() {
            Admission::Rejected => {
                self.total_rejections.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("breaker_rejections_total").increment(1);
                return Err(BreakerError::Rejected);
            }
            Admission::Normal => false,
            Admission::Trial => true,
        };

        // If the call future is dropped mid-flight, the guard releases the
        // trial slot so the breaker cannot wedge in half-open.
        let mut guard = TrialGuard::new(self, trial);

        let timeout = self.config.call_timeout;
        let result = tokio::time::timeout(timeout, op()).await;
        let (recorded_success, result) = match result {
            Err(_) => {
                tracing::warn!(?timeout, "guarded call timed out");
                (false, Err(BreakerError::Timeout(timeout)))
            }
            Ok(Ok(value)) => (true, Ok(value)),
            Ok(Err(e)) => (!e.is_transport(), Err(BreakerError::Inner(e))),
        };

        if !recorded_success {
            self.total_failures.fetch_add(1, Ordering::Relaxed);
        }
        self.record_outcome(recorded_success, trial);
        guard.disarm();

        result
    }

    /// Snapshot of cumulative call counters.
    #[must_use]
    pub fn metrics(&self) -> BreakerMetrics {
        BreakerMetrics {
            total_calls: self.total_calls.load(Ordering::Relaxed),
            total_failures: self.total_failures.load(Ordering::Relaxed),
            total_rejections: self.total_rejections.load(Ordering::Relaxed),
        }
    }

    /// Force the breaker back to closed with an empty window.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        state.phase = Phase::Closed;
        state.window.clear();
        state.opened_at = None;
        state.trial_in_flight = false;
    }

    fn try_admit(&self) -> Admission {
        let mut state = self.state.lock().unwrap();
        match state.phase {
            Phase::Closed => Admission::Normal,
            Phase::Open => {
                let elapsed = state
                    .opened_at
                    .is_none_or(|at| at.elapsed() >= self.config.cool_down);
                if elapsed {
                    tracing::info!("breaker open -> half-open, admitting trial call");
                    metrics::counter!("breaker_transitions_total", "to" => "half_open")
                        .increment(1);
                    state.phase = Phase::HalfOpen;
                    state.trial_in_flight = true;
                    Admission::Trial
                } else {
                    Admission::Rejected
                }
            }
            Phase::HalfOpen => {
                if state.trial_in_flight {
                    Admission::Rejected
                } else {
                    state.trial_in_flight = true;
                    Admission::Trial
                }
            }
        }
    }

    fn record_outcome(&self, success: bool, trial: bool) {
        let mut state = self.state.lock().unwrap();

        if trial {
            state.trial_in_flight = false;
            if success {
                tracing::info!("breaker half-open -> closed, dependency recovered");
                metrics::counter!("breaker_transitions_total", "to" => "closed").increment(1);
                state.phase = Phase::Closed;
                state.window.clear();
                state.opened_at = None;
            } else {
                tracing::warn!("breaker half-open -> open, trial call failed");
                metrics::counter!("breaker_transitions_total", "to" => "open").increment(1);
                state.phase = Phase::Open;
                state.window.clear();
                state.opened_at = Some(Instant::now());
            }
            return;
        }

        // A racing trial may have moved the phase; outcomes admitted under
        // the old closed phase no longer inform it.
        if state.phase != Phase::Closed {
            return;
        }

        if state.window.len() == self.config.window_size {
            state.window.pop_front();
        }
        state.window.push_back(success);

        let failures = state.window.iter().filter(|ok| !**ok).count();
        let ratio = failures as f64 / state.window.len() as f64;
        if state.window.len() >= self.config.min_calls && ratio > self.config.failure_ratio {
            tracing::warn!(
                failures,
                window = state.window.len(),
                ratio,
                "breaker closed -> open"
            );
            metrics::counter!("breaker_transitions_total", "to" => "open").increment(1);
            state.phase = Phase::Open;
            state.opened_at = Some(Instant::now());
        }
    }

    fn abandon_trial(&self) {
        let mut state = self.state.lock().unwrap();
        if state.trial_in_flight {
            tracing::warn!("half-open trial abandoned, breaker reopening");
            state.trial_in_flight = false;
            state.phase = Phase::Open;
            state.opened_at = Some(Instant::now());
        }
    }
}

/// Cumulative breaker counters.
#[derive(Debug, Clone, Copy)]
pub struct BreakerMetrics {
    /// Calls attempted, including rejected ones.
    pub total_calls: u64,
    /// Calls recorded as breaker failures.
    pub total_failures: u64,
    /// Calls rejected without invoking the dependency.
    pub total_rejections: u64,
}

struct TrialGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl<'a> TrialGuard<'a> {
    fn new(breaker: &'a CircuitBreaker, trial: bool) -> Self {
        Self {
            breaker,
            armed: trial,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.abandon_trial();
        }
    }
}
