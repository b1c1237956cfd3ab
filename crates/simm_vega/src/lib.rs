//! # simm_vega (L2: Margin)
//!
//! Vega margin for SIMM-style sensitivity-based methodologies.
//!
//! This crate provides:
//! - Sensitivity netting with Equity / Commodity / FX horizon weighting
//! - Risk factor indexing on IR and credit tenor axes
//! - The fully materialised sensitivity vector of a bucket
//! - Vega risk weight resolution
//! - IR in-bucket correlation (exponential tenor decay, Kronecker joined)
//! - Quadratic aggregation into `K`, `S` and `S_lat`
//! - Rayon-based fan-out across buckets
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               simm_vega (L2)                 │
//! ├──────────────────────────────────────────────┤
//! │  netting/      - ImpliedVol scaling, netting │
//! │  group/        - bucket partitioning         │
//! │  factors/      - indexer, vector builder     │
//! │  weights/      - risk weight                 │
//! │  correlation/  - in-bucket correlation       │
//! │  margin/       - K, S, S_lat, MarginModel    │
//! │  parallel/     - Rayon bucket fan-out        │
//! └──────────────────────────────────────────────┘
//!          ↓
//! ┌──────────────────────────────────────────────┐
//! │               simm_core (L1)                 │
//! │  records, risk classes, errors, calibration  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Data flows netting → group → factors → (weights, correlation) → margin.
//! Every step is a pure function of its inputs, so buckets can be margined
//! concurrently against one shared [`CalibrationParameters`].
//!
//! ## Example
//!
//! ```
//! use simm_core::{CalibrationParameters, RiskClass, SensitivityRecord};
//! use simm_vega::{margin_risk_class, ParallelConfig, VegaMargin};
//!
//! let params = CalibrationParameters::new()
//!     .with_ir_axes(["1Y", "5Y"], ["1Y", "10Y"])
//!     .with_ir_constants(0.01, 60.0, 0.16);
//!
//! let record = |label2: &str, label3: &str, value: f64| {
//!     SensitivityRecord::new("C1", "Risk_IRVol", RiskClass::IR)
//!         .with_bucket("USD")
//!         .with_labels(None, Some(label2), Some(label3))
//!         .with_values(1.0, value, value)
//! };
//! let records = vec![record("1Y", "1Y", 1_000.0), record("5Y", "10Y", -400.0)];
//!
//! let results =
//!     margin_risk_class(&VegaMargin, &records, &params, &ParallelConfig::default()).unwrap();
//!
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].group, "USD");
//! assert!(results[0].k >= results[0].s_lat.abs());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod correlation;
pub mod factors;
pub mod group;
pub mod margin;
pub mod netting;
pub mod parallel;
pub mod weights;

// Re-export commonly used types
pub use correlation::{build_in_bucket_correlation, decay_matrix};
pub use factors::{build_risk_factors, factor_dimension, find_factor_idx, find_factor_idx_1d};
pub use group::{group_netted, partition_by_risk_class, RiskGroup};
pub use margin::{aggregate, margin_risk_group, BucketMargin, MarginModel, MarginResult, VegaMargin};
pub use netting::{net_sensitivities, vega_horizon_scale};
pub use parallel::{margin_portfolio, margin_risk_class, ParallelConfig};
pub use weights::build_risk_weights;

pub use simm_core::CalibrationParameters;
