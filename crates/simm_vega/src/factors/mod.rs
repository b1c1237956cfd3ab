//! Risk factor layout.
//!
//! This module provides:
//! - [`find_factor_idx`] / [`find_factor_idx_1d`]: flat positions on tenor axes
//! - [`build_risk_factors`]: the fully materialised sensitivity vector `s`
//! - [`factor_dimension`]: the length of `s` for a group
//!
//! ## Layout
//!
//! | Risk class | Length | Index |
//! |------------|--------|-------|
//! | IR | maturities × residual maturities | `maturity * n_residual + residual` |
//! | CreditQ, CreditNonQ | qualifiers × tenors | `rank * n_tenors + tenor` |
//! | Equity, Commodity, FX | qualifiers | first-seen qualifier order |

mod builder;
mod indexer;

pub use builder::{build_risk_factors, factor_dimension};
pub use indexer::{find_factor_idx, find_factor_idx_1d};
