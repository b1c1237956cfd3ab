//! CLI configuration management
//!
//! Resolves run settings from CLI arguments, environment variables and an
//! optional TOML settings file.

use serde::Deserialize;
use simm_vega::parallel::DEFAULT_PARALLEL_THRESHOLD;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Environment variable naming the calibration file.
pub const ENV_CALIBRATION: &str = "SIMM_CALIBRATION";
/// Environment variable naming the log level.
pub const ENV_LOG_LEVEL: &str = "SIMM_LOG_LEVEL";
/// Environment variable naming the output format.
pub const ENV_OUTPUT_FORMAT: &str = "SIMM_OUTPUT_FORMAT";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unknown log level name.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown output format name.
    #[error("Invalid output format: {0}. Must be one of: table, csv, json")]
    InvalidOutputFormat(String),

    /// Settings file unreadable or malformed.
    #[error("Configuration file error: {0}")]
    FileError(String),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Everything
    Trace,
    /// Dropped rows and resolved weights
    Debug,
    /// One line per bucket
    #[default]
    Info,
    /// Dropped join rows
    Warn,
    /// Errors only
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// How margin results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Box-drawn table
    #[default]
    Table,
    /// CSV with the result column names
    Csv,
    /// Pretty-printed JSON array
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ConfigError::InvalidOutputFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Settings file layout. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    calibration: Option<PathBuf>,
    log_level: Option<String>,
    output_format: Option<String>,
    parallel_threshold: Option<usize>,
}

/// Resolved CLI configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Calibration TOML file
    pub calibration: Option<PathBuf>,
    /// Log level
    pub log_level: LogLevel,
    /// Output format
    pub output_format: OutputFormat,
    /// Minimum buckets before margining on the Rayon pool
    pub parallel_threshold: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            calibration: None,
            log_level: LogLevel::Info,
            output_format: OutputFormat::Table,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        let file: FileConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;

        let mut config = Self::default();
        if let Some(calibration) = file.calibration {
            config.calibration = Some(calibration);
        }
        if let Some(level) = file.log_level {
            config.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(format) = file.output_format {
            config.output_format = OutputFormat::from_str(&format)?;
        }
        if let Some(threshold) = file.parallel_threshold {
            config.parallel_threshold = threshold;
        }
        Ok(config)
    }

    /// Override with environment variables read through `var`
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(calibration) = var(ENV_CALIBRATION) {
            self.calibration = Some(PathBuf::from(calibration));
        }
        if let Some(level) = var(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(format) = var(ENV_OUTPUT_FORMAT) {
            self.output_format = OutputFormat::from_str(&format)?;
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(calibration) = &cli.calibration {
            self.calibration = Some(calibration.clone());
        }
        if let Some(format) = &cli.output_format {
            self.output_format = OutputFormat::from_str(format)?;
        }
        if cli.verbose {
            self.log_level = LogLevel::Debug;
        }
        if cli.sequential {
            self.parallel_threshold = usize::MAX;
        }
        Ok(())
    }
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Settings file path
    pub config_file: Option<PathBuf>,
    /// Calibration file override
    pub calibration: Option<PathBuf>,
    /// Output format override
    pub output_format: Option<String>,
    /// Raise the log level to debug
    pub verbose: bool,
    /// Keep every bucket on the calling thread
    pub sequential: bool,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<CliConfig, ConfigError> {
    build_config_with_env(cli, |name| std::env::var(name).ok())
}

fn build_config_with_env<F>(cli: &CliArgs, var: F) -> Result<CliConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config_file {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };
    config.apply_env(var)?;
    config.merge_with_cli(cli)?;
    Ok(config)
}
