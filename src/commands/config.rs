//! Configuration inspection commands.

use clap::{Args, Subcommand};

use jobhub_core::config::AppConfig;
use jobhub_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (file merged with environment)
    Show,
    /// Validate the configuration and summarise it
    Validate,
    /// Write the default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => output::print_item(config, format),
        ConfigCommand::Validate => {
            validate(config)?;
            output::print_success(&format!("Configuration '{}' is valid", config_path));
            output::print_kv("Messaging", &config.messaging.provider);
            output::print_kv(
                "Poll timeout",
                &format!("{} ms", config.wait.poll_timeout_ms),
            );
            output::print_kv(
                "Poll interval",
                &format!("{} ms", config.wait.poll_interval_ms),
            );
            output::print_kv(
                "Retry delays",
                &format!("{:?} ms", config.resilience.retry_delays_ms),
            );
            output::print_kv(
                "Breaker threshold",
                &config.resilience.circuit_breaker_failure_threshold.to_string(),
            );
        }
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::internal(format!("Failed to create dir: {}", e)))?;
            }

            tokio::fs::write(out_path, default_config)
                .await
                .map_err(|e| AppError::internal(format!("Failed to write config: {}", e)))?;

            output::print_success(&format!("Default config written to '{}'", out_path));
        }
    }

    Ok(())
}

/// Reject settings the coordinator cannot run with.
fn validate(config: &AppConfig) -> Result<(), AppError> {
    if config.wait.poll_interval_ms == 0 {
        return Err(AppError::validation("wait.poll_interval_ms must be positive"));
    }
    if config.wait.poll_interval_ms > config.wait.poll_timeout_ms {
        return Err(AppError::validation(
            "wait.poll_interval_ms must not exceed wait.poll_timeout_ms",
        ));
    }
    if !matches!(config.messaging.provider.as_str(), "memory" | "queue" | "redis") {
        return Err(AppError::validation(format!(
            "Unknown messaging provider: '{}'",
            config.messaging.provider
        )));
    }
    if !matches!(config.logging.format.as_str(), "json" | "pretty") {
        output::print_warning(&format!(
            "Unknown logging format '{}', falling back to pretty",
            config.logging.format
        ));
    }
    Ok(())
}
