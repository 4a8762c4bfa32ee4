//! # jobhub-management
//!
//! Submits jobs to the remote job service and waits for them to finish.
//!
//! [`JobManagement`] picks the completion-detection strategy from the
//! active [`NotificationTransport`](jobhub_core::traits::NotificationTransport):
//! a subscription-backed transport delivers a completion notification, any
//! other transport falls back to the [`PollCompletionWatcher`].

pub mod error;
pub mod management;
pub mod poll;
pub mod request;
pub mod subscription;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{JobManagementError, JobManagementResult};
pub use management::JobManagement;
pub use poll::PollCompletionWatcher;
pub use request::JobWaitRequest;
