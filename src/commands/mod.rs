//! CLI command definitions and dispatch.

pub mod config;
pub mod features;
pub mod health;
pub mod notify;

use clap::{Parser, Subcommand};

use jobhub_core::config::AppConfig;
use jobhub_core::error::AppError;
use jobhub_core::traits::NotificationTransport;

use crate::output::OutputFormat;

/// JobHub: job submission and completion tooling
#[derive(Debug, Parser)]
#[command(name = "jobhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (falls back to JOBHUB_CONFIG, then config/default.toml)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Configuration inspection
    Config(config::ConfigArgs),
    /// Feature toggle inspection
    Features(features::FeaturesArgs),
    /// Probe the notification transport
    Health(health::HealthArgs),
    /// Publish a job completion notification
    Notify(notify::NotifyArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig, config_path: &str) -> Result<(), AppError> {
        match &self.command {
            Commands::Config(args) => config::execute(args, config, config_path, self.format).await,
            Commands::Features(args) => features::execute(args, config, self.format),
            Commands::Health(args) => health::execute(args, config, self.format).await,
            Commands::Notify(args) => notify::execute(args, config).await,
        }
    }
}

/// Helper: connect the configured notification transport
pub async fn connect_transport(config: &AppConfig) -> Result<NotificationTransport, AppError> {
    jobhub_messaging::connect(&config.messaging).await
}
