//! Publish a job completion notification.

use clap::{Args, ValueEnum};

use jobhub_core::config::AppConfig;
use jobhub_core::error::AppError;
use jobhub_entity::job::{CompletionStatus, JobSummary, RunningStatus};

use crate::output;

/// Completion outcome to publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Outcome {
    /// The job succeeded
    Succeeded,
    /// The job failed
    Failed,
}

impl From<Outcome> for CompletionStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Succeeded => CompletionStatus::Succeeded,
            Outcome::Failed => CompletionStatus::Failed,
        }
    }
}

/// Arguments for the notify command
#[derive(Debug, Args)]
pub struct NotifyArgs {
    /// Topic to publish to
    #[arg(short, long, default_value = "job-notifications")]
    pub topic: String,
    /// Job identifier
    #[arg(long)]
    pub job_id: String,
    /// Job type
    #[arg(long)]
    pub job_type: String,
    /// Specification the job belongs to
    #[arg(long)]
    pub specification_id: String,
    /// Completion outcome
    #[arg(long, value_enum, default_value = "succeeded")]
    pub outcome: Outcome,
    /// Free-text outcome message
    #[arg(long)]
    pub message: Option<String>,
}

/// Execute the notify command
pub async fn execute(args: &NotifyArgs, config: &AppConfig) -> Result<(), AppError> {
    let transport = super::connect_transport(config).await?;
    let notice = completion_notice(args);

    transport
        .send_to_topic(&args.topic, serde_json::to_value(&notice)?)
        .await?;

    tracing::info!(
        topic = %args.topic,
        job_id = %args.job_id,
        job_type = %args.job_type,
        "Published completion notification"
    );
    output::print_success(&format!(
        "Published {:?} notification for job '{}' to '{}'",
        args.outcome, args.job_id, args.topic
    ));
    Ok(())
}

fn completion_notice(args: &NotifyArgs) -> JobSummary {
    JobSummary {
        job_id: args.job_id.clone(),
        job_type: args.job_type.clone(),
        specification_id: Some(args.specification_id.clone()),
        entity_id: None,
        parent_job_id: None,
        running_status: RunningStatus::Completed,
        completion_status: Some(args.outcome.into()),
        outcome: args.message.clone(),
        created: None,
        last_updated: None,
    }
}
