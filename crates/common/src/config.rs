//! Configuration management for the application.
//!
//! This module provides a centralized configuration system that loads settings
//! from configuration files and environment variables.
//!
//! ## Example Configuration
//!
//! ```toml
//! [database]
//! url = "postgres://localhost:5432/ielts"
//!
//! [telemetry]
//! log_level = "debug"
//!
//! [exam]
//! required_question_count = 40
//! reading_time_minutes = 60
//! listening_time_minutes = 40
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Exam rules shared by assembly, validation, scoring and statistics
    #[serde(default)]
    pub exam: ExamConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_db_timeout")]
    pub timeout_seconds: u64,
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable JSON logging format
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            json_logging: default_json_logging(),
            log_level: default_log_level(),
        }
    }
}

/// Exam rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamConfig {
    /// Total questions a gradable test must carry
    #[serde(default = "default_required_question_count")]
    pub required_question_count: u32,

    /// Time allowed for a reading attempt
    #[serde(default = "default_reading_time_minutes")]
    pub reading_time_minutes: u32,

    /// Time allowed for a listening attempt
    #[serde(default = "default_listening_time_minutes")]
    pub listening_time_minutes: u32,

    /// Earliest year accepted by yearly statistics
    #[serde(default = "default_first_statistics_year")]
    pub first_statistics_year: i32,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            required_question_count: default_required_question_count(),
            reading_time_minutes: default_reading_time_minutes(),
            listening_time_minutes: default_listening_time_minutes(),
            first_statistics_year: default_first_statistics_year(),
        }
    }
}

// Default value functions
fn default_pool_size() -> u32 {
    10
}

fn default_db_timeout() -> u64 {
    30
}

fn default_service_name() -> String {
    "ielts-practice".to_string()
}

fn default_json_logging() -> bool {
    false
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_required_question_count() -> u32 {
    40
}

fn default_reading_time_minutes() -> u32 {
    60
}

fn default_listening_time_minutes() -> u32 {
    40
}

fn default_first_statistics_year() -> i32 {
    2024
}

impl AppConfig {
    /// Load configuration from configuration files and environment variables.
    ///
    /// Sources, later overriding earlier:
    /// 1. config/default.toml (if exists)
    /// 2. config/{environment}.toml (if exists, where environment is from APP_ENV)
    /// 3. Environment variables (prefixed with APP_, e.g. APP_EXAM__READING_TIME_MINUTES=75)
    pub fn load() -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let app_config: AppConfig =
            toml::from_str(source).context("Failed to parse TOML configuration")?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL is required");
        }

        if self.database.pool_size == 0 {
            anyhow::bail!("Database pool size must be greater than 0");
        }

        if self.database.timeout_seconds == 0 {
            anyhow::bail!("Database timeout must be greater than 0");
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.telemetry.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log level '{}'. Must be one of: {}",
                self.telemetry.log_level,
                valid_log_levels.join(", ")
            );
        }

        if self.exam.required_question_count == 0 {
            anyhow::bail!("Required question count must be greater than 0");
        }

        if self.exam.reading_time_minutes == 0 || self.exam.listening_time_minutes == 0 {
            anyhow::bail!("Exam time limits must be greater than 0");
        }

        Ok(())
    }

    /// Get the database connection timeout as a Duration
    pub fn database_timeout(&self) -> Duration {
        Duration::from_secs(self.database.timeout_seconds)
    }

    /// Create a development configuration with sensible defaults
    pub fn development() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgres://localhost:5432/ielts_dev".to_string(),
                pool_size: 5,
                timeout_seconds: 30,
            },
            telemetry: TelemetryConfig {
                service_name: "ielts-practice-dev".to_string(),
                json_logging: false,
                log_level: "debug".to_string(),
            },
            exam: ExamConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = AppConfig::development();
        assert!(config.validate().is_ok());

        let mut invalid = config.clone();
        invalid.database.url = String::new();
        assert!(invalid.validate().is_err());

        let mut invalid = config.clone();
        invalid.telemetry.log_level = "verbose".to_string();
        assert!(invalid.validate().is_err());

        let mut invalid = config;
        invalid.exam.required_question_count = 0;
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_from_toml_applies_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [database]
            url = "postgres://localhost/ielts"

            [exam]
            reading_time_minutes = 75
            "#,
        )
        .unwrap();

        assert_eq!(config.database.pool_size, 10);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.exam.reading_time_minutes, 75);
        assert_eq!(config.exam.listening_time_minutes, 40);
        assert_eq!(config.exam.required_question_count, 40);
        assert_eq!(config.exam.first_statistics_year, 2024);
    }

    #[test]
    fn test_load_reads_prefixed_environment() {
        std::env::set_var("APP_DATABASE__URL", "postgres://localhost/ielts_env");
        std::env::set_var("APP_EXAM__READING_TIME_MINUTES", "75");
        let loaded = AppConfig::load();
        std::env::remove_var("APP_DATABASE__URL");
        std::env::remove_var("APP_EXAM__READING_TIME_MINUTES");

        let config = loaded.unwrap();
        assert_eq!(config.database.url, "postgres://localhost/ielts_env");
        assert_eq!(config.exam.reading_time_minutes, 75);
        assert_eq!(config.exam.listening_time_minutes, 40);
    }

    #[test]
    fn test_database_timeout() {
        let config = AppConfig::development();
        assert_eq!(config.database_timeout(), Duration::from_secs(30));
    }
}
