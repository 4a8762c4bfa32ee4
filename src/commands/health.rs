//! Notification transport health check.

use clap::Args;

use jobhub_core::config::AppConfig;
use jobhub_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the health command
#[derive(Debug, Args)]
pub struct HealthArgs {
    /// Queue to probe
    #[arg(short, long, default_value = "jobs")]
    pub queue: String,
}

/// Execute the health check. Fails when the transport reports unhealthy.
pub async fn execute(
    args: &HealthArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let transport = super::connect_transport(config).await?;
    let status = transport.is_health_ok(&args.queue).await;

    match format {
        OutputFormat::Json => output::print_item(&status, format),
        OutputFormat::Table => {
            output::print_kv("Transport", transport.service_name());
            output::print_kv(
                "Subscriptions",
                if transport.supports_subscriptions() {
                    "supported"
                } else {
                    "not supported (poll mode)"
                },
            );
            output::print_kv("Queue", &args.queue);
            output::print_kv("Healthy", &status.ok.to_string());
            if !status.message.is_empty() {
                output::print_kv("Message", &status.message);
            }
        }
    }

    if status.ok {
        Ok(())
    } else {
        Err(AppError::service_unavailable(format!(
            "Transport '{}' is unhealthy: {}",
            transport.service_name(),
            status.message
        )))
    }
}
