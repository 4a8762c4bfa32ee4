//! Feature toggle commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use jobhub_core::config::{AppConfig, Feature};
use jobhub_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for feature commands
#[derive(Debug, Args)]
pub struct FeaturesArgs {
    /// Feature subcommand
    #[command(subcommand)]
    pub command: FeaturesCommand,
}

/// Feature subcommands
#[derive(Debug, Subcommand)]
pub enum FeaturesCommand {
    /// List every recognized toggle and its state
    List,
    /// Show whether a single toggle is enabled
    Get {
        /// Toggle key, e.g. notificationsEnabled
        key: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct FeatureRow {
    #[tabled(rename = "Feature")]
    key: &'static str,
    #[tabled(rename = "Enabled")]
    enabled: bool,
}

/// Execute feature commands
pub fn execute(
    args: &FeaturesArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let toggles = config.feature_toggles();

    match &args.command {
        FeaturesCommand::List => {
            let rows: Vec<FeatureRow> = toggles
                .states()
                .into_iter()
                .map(|(feature, enabled)| FeatureRow {
                    key: feature.key(),
                    enabled,
                })
                .collect();
            output::print_list(&rows, format);
        }
        FeaturesCommand::Get { key } => {
            let feature = Feature::from_key(key)
                .ok_or_else(|| AppError::not_found(format!("Unknown feature toggle '{key}'")))?;
            output::print_kv(feature.key(), &toggles.is_enabled(feature).to_string());
        }
    }

    Ok(())
}
