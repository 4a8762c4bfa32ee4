//! # jobhub-client
//!
//! The contract of the remote job service client ([`JobsApiClient`]) and the
//! resilience layer every call to it goes through: a retry policy for
//! transient failures and a circuit breaker that stops hammering a degraded
//! service. [`ResilientJobsApi`] combines both.

pub mod api;
pub mod policy;
pub mod resilient;

pub use api::JobsApiClient;
pub use policy::{ResiliencePolicy, Transience};
pub use resilient::ResilientJobsApi;
