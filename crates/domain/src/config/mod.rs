//! Configuration module for Sinkhole
//!
//! This module contains all configuration structures organized by concern:
//! - `root`: Main configuration, loading and validation
//! - `telemetry`: Retention window, OverTime slots, GC cadence, privacy
//! - `gravity`: Gravity list database and classification options
//! - `snapshot`: Durable snapshot location
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod errors;
pub mod gravity;
pub mod logging;
pub mod root;
pub mod snapshot;
pub mod telemetry;

pub use errors::ConfigError;
pub use gravity::GravityConfig;
pub use logging::LoggingConfig;
pub use root::Config;
pub use snapshot::SnapshotConfig;
pub use telemetry::TelemetryConfig;
