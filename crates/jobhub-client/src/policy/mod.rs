//! Resilience policies applied to every job service call.
//!
//! A [`ResiliencePolicy`] wraps a call with a retry schedule and a shared
//! circuit breaker. Only transient failures are retried and counted against
//! the breaker: transient errors (see [`AppError::is_transient`]) and
//! responses whose status code is transient (see [`Transience`]). Anything
//! else is returned to the caller on the first attempt.

pub mod circuit_breaker;
pub mod retry;

use std::future::Future;

use jobhub_core::config::resilience::ResilienceConfig;
use jobhub_core::error::AppError;
use jobhub_core::result::AppResult;
use jobhub_core::types::ApiResponse;
use jobhub_entity::job::Job;

pub use circuit_breaker::{CallPermit, CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use retry::RetryPolicy;

/// Classifies a successful call outcome as transient or final.
pub trait Transience {
    /// Whether the outcome should be retried.
    fn is_transient_failure(&self) -> bool {
        false
    }
}

impl<T> Transience for ApiResponse<T> {
    fn is_transient_failure(&self) -> bool {
        ApiResponse::is_transient_failure(self)
    }
}

impl Transience for Job {}

impl<T> Transience for Vec<T> {}

impl Transience for () {}

/// Retry plus circuit breaker.
#[derive(Debug)]
pub struct ResiliencePolicy {
    retry: RetryPolicy,
    breaker: CircuitBreaker,
}

impl ResiliencePolicy {
    /// Create a policy from its parts.
    pub fn new(retry: RetryPolicy, breaker: CircuitBreaker) -> Self {
        Self { retry, breaker }
    }

    /// Build the policy described by the `[resilience]` configuration section.
    pub fn from_config(config: &ResilienceConfig) -> Self {
        Self::new(
            RetryPolicy::new(config.retry_delays()),
            CircuitBreaker::new(CircuitBreakerConfig {
                failure_threshold: config.circuit_breaker_failure_threshold,
                failure_window: config.failure_window(),
                break_duration: config.break_duration(),
            }),
        )
    }

    /// A policy that calls straight through: no retries, no breaker.
    pub fn passthrough() -> Self {
        Self::new(RetryPolicy::none(), CircuitBreaker::disabled())
    }

    /// Current breaker state.
    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    /// Run `action` under the policy.
    ///
    /// When the retry schedule is exhausted the last outcome is returned as
    /// is, so a transient status code still reaches the caller as a response.
    pub async fn execute<R, F, Fut>(&self, operation: &str, mut action: F) -> AppResult<R>
    where
        R: Transience,
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<R>>,
    {
        let mut attempt = 0;

        loop {
            let Some(permit) = self.breaker.try_acquire() else {
                tracing::warn!(operation = %operation, "Job service call rejected, circuit open");
                return Err(AppError::circuit_open(format!(
                    "Circuit open, '{operation}' was not attempted"
                )));
            };

            let outcome = action().await;
            let transient = match &outcome {
                Ok(response) => response.is_transient_failure(),
                Err(e) => e.is_transient(),
            };

            if !transient {
                permit.success();
                return outcome;
            }

            permit.failure();

            let Some(delay) = self.retry.delay_for(attempt) else {
                return outcome;
            };

            attempt += 1;
            tracing::warn!(
                operation = %operation,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = ?outcome.as_ref().err(),
                "Transient job service failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
