//! Position file loading.
//!
//! Positions are CSV with the sensitivity column names as the header
//! (`CombinationID, RiskType, RiskClass, ProductClass, Qualifier, Bucket,
//! Label1, Label2, Label3, ImpliedVol, Stat_Value, AmountUSD`). Blank cells in
//! the optional columns read as absent.

use std::path::Path;

use simm_core::SensitivityRecord;
use tracing::debug;

use crate::{CliError, Result};

/// Loads every sensitivity row of a positions CSV file.
pub fn load_positions(path: &Path) -> Result<Vec<SensitivityRecord>> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<SensitivityRecord>, csv::Error>>()?;

    debug!(path = %path.display(), rows = records.len(), "Loaded positions");
    Ok(records)
}
