//! Error types for structured error handling.
//!
//! This module provides:
//! - `SchemaError`: Required input field missing or malformed
//! - `ConfigurationError`: Calibration entry absent or unusable for a risk class
//! - `ComputationFault`: Numerical failure during margin computation
//! - `MarginError`: Umbrella error returned by the margin pipeline
//!
//! None of these are retried internally. The computation is deterministic, so
//! the caller decides whether to skip a bucket or abort the run.

use thiserror::Error;

use super::risk_class::RiskClass;

/// Input rows are missing a field or disagree on their shape.
///
/// # Examples
/// ```
/// use simm_core::types::{RiskClass, SchemaError};
///
/// let err = SchemaError::MissingField { field: "Bucket", risk_class: RiskClass::IR, row: 3 };
/// assert_eq!(format!("{}", err), "Missing field Bucket for IR sensitivity at row 3");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A field required by the risk class grouping key is absent.
    #[error("Missing field {field} for {risk_class} sensitivity at row {row}")]
    MissingField {
        /// Column name of the missing field
        field: &'static str,
        /// Risk class of the working set
        risk_class: RiskClass,
        /// Zero-based row position in the working set
        row: usize,
    },

    /// The working set contains more than one risk class.
    #[error("Mixed risk classes in working set: expected {expected}, found {found} at row {row}")]
    MixedRiskClass {
        /// Risk class of the first row
        expected: RiskClass,
        /// Offending risk class
        found: RiskClass,
        /// Zero-based row position of the offending row
        row: usize,
    },

    /// A margin group holds rows of more than one portfolio combination.
    #[error("Mixed combinations in group: expected {expected}, found {found} at row {row}")]
    MixedCombination {
        /// CombinationID of the first row
        expected: String,
        /// Offending CombinationID
        found: String,
        /// Zero-based row position of the offending row
        row: usize,
    },

    /// Risk class label not recognised.
    #[error("Unknown risk class: {0}")]
    UnknownRiskClass(String),

    /// A numeric field holds NaN or infinity.
    #[error("Non-finite {field} at row {row}")]
    NonFinite {
        /// Column name of the offending field
        field: &'static str,
        /// Zero-based row position
        row: usize,
    },
}

/// Calibration lookups absent for the risk class being processed.
///
/// # Examples
/// ```
/// use simm_core::types::ConfigurationError;
///
/// let err = ConfigurationError::MissingParameter("IR_VRW");
/// assert_eq!(format!("{}", err), "Missing calibration parameter: IR_VRW");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A named calibration entry (weight table, tenor axis, constant) is absent.
    #[error("Missing calibration parameter: {0}")]
    MissingParameter(&'static str),

    /// A tenor label cannot be converted to a year fraction.
    #[error("Invalid tenor label: {0:?}")]
    InvalidTenor(String),

    /// A calibration value is NaN, infinite or otherwise unusable.
    #[error("Invalid calibration value for {name}: {value}")]
    InvalidValue {
        /// Parameter name
        name: String,
        /// Offending value
        value: f64,
    },

    /// The calibration file could not be read or parsed.
    #[error("Calibration file error: {0}")]
    FileError(String),
}

/// Numerical failures inside the margin computation.
///
/// # Examples
/// ```
/// use simm_core::types::ComputationFault;
///
/// let err = ComputationFault::DegenerateDecay { left: 0.0, right: 1.0 };
/// assert!(format!("{}", err).contains("0 and 1"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationFault {
    /// Correlation decay divides by a zero tenor for two distinct tenors.
    #[error("Degenerate correlation decay between tenors {left} and {right} years")]
    DegenerateDecay {
        /// Year fraction of the first tenor
        left: f64,
        /// Year fraction of the second tenor
        right: f64,
    },

    /// The quadratic form is negative beyond floating-point tolerance.
    #[error("Negative quadratic form: {0}")]
    NegativeQuadraticForm(f64),

    /// A NaN or infinity appeared in an intermediate result.
    #[error("Non-finite value in {0}")]
    NonFinite(String),

    /// Sensitivity vector and correlation matrix disagree on dimension.
    #[error("Dimension mismatch: vector has {vector} factors, correlation is {matrix}x{matrix}")]
    DimensionMismatch {
        /// Length of the sensitivity vector
        vector: usize,
        /// Order of the correlation matrix
        matrix: usize,
    },

    /// A statistical distribution could not be constructed.
    #[error("Distribution error: {0}")]
    Distribution(String),
}

/// Umbrella error for the margin pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarginError {
    /// Input schema problem.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Calibration problem.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Numerical problem.
    #[error("Computation fault: {0}")]
    Computation(#[from] ComputationFault),
}
