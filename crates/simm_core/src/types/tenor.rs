//! Tenor label conversion.
//!
//! Tenor axes in calibration files are written as labels such as `"2W"`,
//! `"3M"` or `"10Y"`. The correlation decay works on year fractions.
//!
//! # Examples
//!
//! ```
//! use simm_core::types::tenor::convert_tenor_to_years;
//!
//! assert_eq!(convert_tenor_to_years("3M").unwrap(), 0.25);
//! assert_eq!(convert_tenor_to_years("10Y").unwrap(), 10.0);
//! assert_eq!(convert_tenor_to_years("0").unwrap(), 0.0);
//! assert!(convert_tenor_to_years("abc").is_err());
//! ```

use super::error::ConfigurationError;

/// Days per year for `D` tenors.
const DAYS_PER_YEAR: f64 = 365.0;
/// Weeks per year for `W` tenors.
const WEEKS_PER_YEAR: f64 = 52.0;
/// Months per year for `M` tenors.
const MONTHS_PER_YEAR: f64 = 12.0;

/// Converts a tenor label to a year fraction.
///
/// Accepted forms are `<n>D`, `<n>W`, `<n>M`, `<n>Y` (unit is case-insensitive)
/// and a bare number, read as years.
///
/// # Errors
/// `ConfigurationError::InvalidTenor` for empty, negative or unrecognised labels.
pub fn convert_tenor_to_years(tenor: &str) -> Result<f64, ConfigurationError> {
    let label = tenor.trim();
    let invalid = || ConfigurationError::InvalidTenor(tenor.to_string());

    let last = label.chars().last().ok_or_else(invalid)?;
    let (term, divisor) = match last.to_ascii_uppercase() {
        'D' => (&label[..label.len() - 1], DAYS_PER_YEAR),
        'W' => (&label[..label.len() - 1], WEEKS_PER_YEAR),
        'M' => (&label[..label.len() - 1], MONTHS_PER_YEAR),
        'Y' => (&label[..label.len() - 1], 1.0),
        _ => (label, 1.0),
    };

    let value: f64 = term.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }

    Ok(value / divisor)
}
