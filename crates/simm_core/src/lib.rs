//! # simm_core: Foundation Layer for SIMM Margin Calculation
//!
//! ## Layer 1 (Foundation) Role
//!
//! simm_core serves as the bottom layer of the margin workspace, providing:
//! - Risk class identification (`types::risk_class`)
//! - Raw and netted sensitivity rows (`types::sensitivity`)
//! - Tenor label conversion to year fractions (`types::tenor`)
//! - Error taxonomy: `SchemaError`, `ConfigurationError`, `ComputationFault` (`types::error`)
//! - The read-only calibration bundle (`calibration`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other simm_* crates, with minimal external dependencies:
//! - thiserror: Error derivation
//! - serde: Deserialisation of sensitivity rows and calibration files
//! - toml: Calibration file format
//!
//! ## Usage Examples
//!
//! ```rust
//! use simm_core::types::{convert_tenor_to_years, RiskClass};
//! use simm_core::calibration::CalibrationParameters;
//!
//! let class: RiskClass = "CreditQ".parse().unwrap();
//! assert_eq!(class, RiskClass::CreditQ);
//!
//! assert_eq!(convert_tenor_to_years("6M").unwrap(), 0.5);
//!
//! let params = CalibrationParameters::from_toml_str(
//!     r#"
//!     IR_Vega_Maturity = ["1Y", "5Y"]
//!     IR_Vega_Residual_Maturity = ["1Y"]
//!     IR_Alpha = 0.01
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(params.ir_vega_maturity.as_ref().map(Vec::len), Some(2));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod calibration;
pub mod types;

pub use calibration::CalibrationParameters;
pub use types::{
    convert_tenor_to_years, ComputationFault, ConfigurationError, MarginError, NettedSensitivity,
    RiskClass, SchemaError, SensitivityRecord,
};
