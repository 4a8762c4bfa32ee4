//! Response envelope returned by the remote job service client.

use serde::{Deserialize, Serialize};

/// A status code plus optional content, as returned by every job-service call.
///
/// Any code in `200..=299` is success-shaped, including intermediate gateway
/// codes such as `202` or `207`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// HTTP-style status code.
    pub status_code: u16,
    /// Response body, absent when the service returned no content.
    pub content: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a response with a status code and optional content.
    pub fn new(status_code: u16, content: Option<T>) -> Self {
        Self {
            status_code,
            content,
        }
    }

    /// A `200 OK` response carrying `content`.
    pub fn ok(content: T) -> Self {
        Self::new(200, Some(content))
    }

    /// A response with a status code and no content.
    pub fn empty(status_code: u16) -> Self {
        Self::new(status_code, None)
    }

    /// Whether the status code falls within the success range.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status_code)
    }

    /// Whether the status code indicates a transient server-side failure
    /// (request timeout, throttling, or any 5xx).
    pub fn is_transient_failure(&self) -> bool {
        matches!(self.status_code, 408 | 429) || self.status_code >= 500
    }

    /// Consume the envelope and return its content.
    pub fn into_content(self) -> Option<T> {
        self.content
    }
}
