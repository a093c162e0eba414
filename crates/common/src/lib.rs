//! Common utilities and shared functionality for the IELTS practice platform.
//!
//! This crate provides foundational utilities used across all layers:
//! - Configuration management
//! - Tracing setup
//! - DateTime operations, including the week-of-month calendar used by statistics

pub mod config;
pub mod datetime;
pub mod telemetry;

// Re-export commonly used types
pub use config::{AppConfig, DatabaseConfig, ExamConfig, TelemetryConfig};
pub use datetime::week_of_month;
pub use telemetry::init_tracing;

/// Common error type used throughout the crate
pub type Result<T> = std::result::Result<T, anyhow::Error>;
