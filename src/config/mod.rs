//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `TRAINING_REGISTER` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment yields a usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use training_register::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Database at {}", config.database.path);
//! ```

mod database;
mod error;
mod logging;
mod reports;
mod scheduling;

pub use database::{DatabaseConfig, IN_MEMORY_PATH};
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use reports::{ReportFormat, ReportsConfig};
pub use scheduling::SchedulingConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// SQLite database location and pool settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Debounce delays for writes and recomputes
    #[serde(default)]
    pub scheduling: SchedulingConfig,

    /// Report output directory and format
    #[serde(default)]
    pub reports: ReportsConfig,

    /// Tracing filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TRAINING_REGISTER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TRAINING_REGISTER__DATABASE__PATH=/var/lib/register.db` -> `database.path`
    /// - `TRAINING_REGISTER__SCHEDULING__FIELD_DEBOUNCE_MS=750` -> `scheduling.field_debounce_ms`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TRAINING_REGISTER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first section that is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.scheduling.validate()?;
        self.reports.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
