//! JobHub CLI: job coordination tooling.
//!
//! Loads configuration, initialises logging, and dispatches the selected
//! subcommand.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use jobhub_core::config::AppConfig;
use jobhub_core::config::logging::LoggingConfig;
use jobhub_core::error::AppError;

mod commands;
mod output;

use commands::Cli;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());

    let config = match load_configuration(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);
    tracing::debug!("Loaded config from '{}'", config_path);

    if let Err(e) = cli.execute(&config, &config_path).await {
        tracing::error!("Command failed: {}", e);
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Pick the config file: `--config`, then `JOBHUB_CONFIG`, then the default.
fn resolve_config_path(flag: Option<&str>) -> String {
    flag.map(str::to_string)
        .or_else(|| std::env::var("JOBHUB_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Load configuration from file and environment
fn load_configuration(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
        .map_err(|e| AppError::configuration(format!("Config load error: {}", e)))
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
