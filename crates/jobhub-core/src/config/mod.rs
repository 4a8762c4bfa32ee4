//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from an
//! optional TOML file merged with `JOBHUB__`-prefixed environment variables.
//! Each sub-module represents a logical configuration section; every section
//! may be omitted and falls back to its defaults.

pub mod features;
pub mod logging;
pub mod messaging;
pub mod resilience;
pub mod wait;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::messaging::MessagingConfig;
use self::resilience::ResilienceConfig;
use self::wait::WaitConfig;

use crate::error::AppError;

pub use self::features::{Feature, FeatureToggles};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion-wait defaults.
    #[serde(default)]
    pub wait: WaitConfig,
    /// Retry and circuit-breaker settings for the job service client.
    #[serde(default)]
    pub resilience: ResilienceConfig,
    /// Notification transport settings.
    #[serde(default)]
    pub messaging: MessagingConfig,
    /// Raw feature toggle table, keyed by toggle name.
    #[serde(default)]
    pub features: HashMap<String, String>,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional. Environment variables prefixed with `JOBHUB`
    /// (nested with `__`, e.g. `JOBHUB__MESSAGING__PROVIDER`) override it.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("JOBHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Resolve the feature toggle table into typed toggles.
    pub fn feature_toggles(&self) -> FeatureToggles {
        FeatureToggles::from_settings(&self.features)
    }
}
