//! SIMM CLI - Command Line Operations for Vega Margin
//!
//! This is the operational entry point for the SIMM vega margin library.
//!
//! # Commands
//!
//! - `simm vega --positions <file>` - Compute vega bucket margins
//! - `simm check` - Validate a calibration file
//!
//! # Configuration
//!
//! Settings resolve CLI > environment (`SIMM_CALIBRATION`, `SIMM_LOG_LEVEL`,
//! `SIMM_OUTPUT_FORMAT`) > `--config` file > defaults. `RUST_LOG`, when set,
//! takes over the log filter entirely.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod loader;

pub use error::{CliError, Result};

use config::{build_config, CliArgs};

/// SIMM Vega Margin CLI
#[derive(Parser)]
#[command(name = "simm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute vega margin per risk-class bucket
    Vega {
        /// Path to positions file (CSV)
        #[arg(short, long)]
        positions: PathBuf,

        /// Path to calibration file (TOML)
        #[arg(long)]
        calibration: Option<PathBuf>,

        /// Output format (table, csv, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Margin buckets on the calling thread only
        #[arg(long)]
        sequential: bool,
    },

    /// Validate a calibration file and print the resolved parameters
    Check {
        /// Path to calibration file (TOML)
        #[arg(long)]
        calibration: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut args = CliArgs {
        config_file: cli.config,
        verbose: cli.verbose,
        ..Default::default()
    };
    match &cli.command {
        Commands::Vega {
            calibration,
            format,
            sequential,
            ..
        } => {
            args.calibration = calibration.clone();
            args.output_format = format.clone();
            args.sequential = *sequential;
        }
        Commands::Check { calibration } => {
            args.calibration = calibration.clone();
        }
    }
    let config = build_config(&args)?;

    // Initialise tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter_str()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Vega { positions, .. } => commands::vega::run(&positions, &config),
        Commands::Check { .. } => commands::check::run(&config),
    }
}
