//! Circuit breaker guarding calls to the job service.
//!
//! # State Machine
//!
//! ```text
//! Closed --[failure_threshold failures within failure_window]--> Open
//! Open --[break_duration elapsed]--> HalfOpen
//! HalfOpen --[trial call succeeds]--> Closed
//! HalfOpen --[trial call fails]--> Open (reset)
//! ```
//!
//! While half-open only one trial call is admitted; concurrent callers are
//! rejected until the trial reports back. A trial whose [`CallPermit`] is
//! dropped unreported (the call was cancelled) frees the slot for the next
//! caller.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Configuration for the circuit breaker.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Failures that open the circuit. Zero disables the breaker.
    pub failure_threshold: u32,
    /// Failures older than this are forgotten.
    pub failure_window: Duration,
    /// How long the circuit stays open before admitting a trial call.
    pub break_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 100,
            failure_window: Duration::from_secs(60),
            break_duration: Duration::from_secs(60),
        }
    }
}

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls flow normally.
    Closed,
    /// Calls are rejected without being attempted.
    Open,
    /// A single trial call decides whether to close again.
    HalfOpen,
}

#[derive(Debug)]
struct CircuitBreakerInner {
    state: CircuitState,
    failures: u32,
    first_failure_at: Option<Instant>,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

impl CircuitBreakerInner {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            first_failure_at: None,
            opened_at: None,
            trial_in_flight: false,
        }
    }

    fn open(&mut self, now: Instant) {
        self.state = CircuitState::Open;
        self.opened_at = Some(now);
        self.failures = 0;
        self.first_failure_at = None;
        self.trial_in_flight = false;
    }

    fn close(&mut self) {
        self.state = CircuitState::Closed;
        self.opened_at = None;
        self.failures = 0;
        self.first_failure_at = None;
        self.trial_in_flight = false;
    }
}

/// Thread-safe circuit breaker shared by every call through a policy.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<CircuitBreakerInner>,
}

impl CircuitBreaker {
    /// Create a closed circuit breaker.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(CircuitBreakerInner::new()),
        }
    }

    /// A breaker that never opens.
    pub fn disabled() -> Self {
        Self::new(CircuitBreakerConfig {
            failure_threshold: 0,
            ..CircuitBreakerConfig::default()
        })
    }

    /// Current state, advancing Open to HalfOpen once the break has elapsed.
    pub fn state(&self) -> CircuitState {
        let mut inner = self.lock();
        self.advance(&mut inner, Instant::now());
        inner.state
    }

    /// Ask permission to make a call.
    ///
    /// Returns `None` while the circuit is open, or while a half-open trial
    /// call is already in flight.
    pub fn try_acquire(&self) -> Option<CallPermit<'_>> {
        let mut inner = self.lock();
        self.advance(&mut inner, Instant::now());

        let trial = match inner.state {
            CircuitState::Closed => false,
            CircuitState::Open => return None,
            CircuitState::HalfOpen if inner.trial_in_flight => return None,
            CircuitState::HalfOpen => {
                inner.trial_in_flight = true;
                true
            }
        };

        Some(CallPermit {
            breaker: self,
            trial,
            reported: false,
        })
    }

    /// Report a call that did not fail transiently.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::HalfOpen => {
                inner.close();
                tracing::info!("Circuit breaker CLOSED - job service recovered");
            }
            CircuitState::Closed => {
                inner.failures = 0;
                inner.first_failure_at = None;
            }
            CircuitState::Open => {}
        }
    }

    /// Report a transient failure.
    pub fn record_failure(&self) {
        if self.config.failure_threshold == 0 {
            return;
        }

        let now = Instant::now();
        let mut inner = self.lock();

        match inner.state {
            CircuitState::HalfOpen => {
                inner.open(now);
                tracing::warn!(
                    break_secs = self.config.break_duration.as_secs_f64(),
                    "Circuit breaker trial call failed, circuit re-opened"
                );
            }
            CircuitState::Closed => {
                let window_expired = inner
                    .first_failure_at
                    .is_some_and(|first| now.duration_since(first) > self.config.failure_window);
                if window_expired || inner.first_failure_at.is_none() {
                    inner.failures = 0;
                    inner.first_failure_at = Some(now);
                }

                inner.failures += 1;
                if inner.failures >= self.config.failure_threshold {
                    inner.open(now);
                    tracing::warn!(
                        threshold = self.config.failure_threshold,
                        break_secs = self.config.break_duration.as_secs_f64(),
                        "Circuit breaker OPENED - job service calls suspended"
                    );
                }
            }
            CircuitState::Open => {}
        }
    }

    fn abandon_trial(&self) {
        let mut inner = self.lock();
        if inner.state == CircuitState::HalfOpen && inner.trial_in_flight {
            inner.trial_in_flight = false;
            tracing::debug!("Circuit breaker trial call abandoned, admitting another");
        }
    }

    fn advance(&self, inner: &mut CircuitBreakerInner, now: Instant) {
        if inner.state != CircuitState::Open {
            return;
        }
        let elapsed = inner
            .opened_at
            .map(|opened| now.duration_since(opened))
            .unwrap_or_default();
        if elapsed >= self.config.break_duration {
            inner.state = CircuitState::HalfOpen;
            inner.trial_in_flight = false;
            tracing::debug!("Circuit breaker half-open, admitting a trial call");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CircuitBreakerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Permission to make one call, handed out by [`CircuitBreaker::try_acquire`].
///
/// Report the outcome with [`success`](Self::success) or
/// [`failure`](Self::failure). Dropping a half-open trial permit unreported
/// releases the trial slot.
#[derive(Debug)]
#[must_use = "report the call outcome through the permit"]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    reported: bool,
}

impl CallPermit<'_> {
    /// Whether this permit is the half-open trial call.
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    /// Report a call that did not fail transiently.
    pub fn success(mut self) {
        self.reported = true;
        self.breaker.record_success();
    }

    /// Report a transient failure.
    pub fn failure(mut self) {
        self.reported = true;
        self.breaker.record_failure();
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if self.trial && !self.reported {
            self.breaker.abandon_trial();
        }
    }
}
