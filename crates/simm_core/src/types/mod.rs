//! Core margin types.
//!
//! This module provides:
//! - `risk_class`: The six SIMM risk classes
//! - `sensitivity`: Raw sensitivity rows and their netted counterparts
//! - `tenor`: Tenor label to year-fraction conversion
//! - `error`: Structured error types for schema, configuration and computation failures
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`RiskClass`] from `risk_class`
//! - [`SensitivityRecord`], [`NettedSensitivity`] from `sensitivity`
//! - [`convert_tenor_to_years`] from `tenor`
//! - [`MarginError`], [`SchemaError`], [`ConfigurationError`], [`ComputationFault`] from `error`

pub mod error;
pub mod risk_class;
pub mod sensitivity;
pub mod tenor;

// Re-export commonly used types at module level
pub use error::{ComputationFault, ConfigurationError, MarginError, SchemaError};
pub use risk_class::RiskClass;
pub use sensitivity::{NettedSensitivity, SensitivityRecord};
pub use tenor::convert_tenor_to_years;
