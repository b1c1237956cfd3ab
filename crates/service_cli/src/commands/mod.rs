//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod check;
pub mod vega;

use simm_core::CalibrationParameters;
use tracing::info;

use crate::config::CliConfig;
use crate::{CliError, Result};

/// Loads and validates the calibration named by the configuration.
pub(crate) fn load_calibration(config: &CliConfig) -> Result<CalibrationParameters> {
    let path = config.calibration.as_ref().ok_or_else(|| {
        CliError::InvalidArgument(
            "No calibration file. Pass --calibration or set SIMM_CALIBRATION".to_string(),
        )
    })?;
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }

    info!("  Calibration: {}", path.display());
    Ok(CalibrationParameters::from_file(path)?)
}
