//! Job domain models.

pub mod log;
pub mod model;
pub mod status;
pub mod summary;

pub use log::{JobLog, JobLogUpdate};
pub use model::{Job, JobCreateRequest, JobCreateResult, Trigger};
pub use status::{CompletionStatus, RunningStatus};
pub use summary::JobSummary;
