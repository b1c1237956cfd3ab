//! CLI error types.

use simm_core::types::{ConfigurationError, MarginError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the `simm` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// A command-line value is not usable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// CLI settings could not be resolved.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Calibration could not be loaded or validated.
    #[error("Calibration error: {0}")]
    Calibration(#[from] ConfigurationError),

    /// The margin pipeline failed.
    #[error("Margin error: {0}")]
    Margin(#[from] MarginError),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A positions file is malformed, or CSV output failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
