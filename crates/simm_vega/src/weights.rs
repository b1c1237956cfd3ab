//! Vega risk weight resolution.

use simm_core::types::{ConfigurationError, RiskClass};
use simm_core::CalibrationParameters;
use tracing::debug;

use crate::group::RiskGroup;

/// Liquidity horizon, in days, the vega risk weights are quoted against.
const BASE_HORIZON_DAYS: f64 = 10.0;

/// Resolves the scalar risk weight applied to every entry of `s`.
///
/// `RW = min(IR_VRW × sqrt(IR_LH) / sqrt(10), 1)`.
///
/// The vega risk weight of the group's own class is looked up and logged,
/// but the returned weight is built from the IR constants for every risk
/// class. That is how the methodology is currently calibrated.
///
/// # Errors
///
/// `ConfigurationError::MissingParameter` when `IR_VRW` or `IR_LH` is absent.
///
/// # Examples
///
/// ```rust
/// use simm_core::{CalibrationParameters, RiskClass};
/// use simm_vega::group::RiskGroup;
/// use simm_vega::weights::build_risk_weights;
///
/// let params = CalibrationParameters::new().with_ir_constants(0.01, 60.0, 0.16);
/// let group = RiskGroup::new(RiskClass::Equity, "1", vec![]);
///
/// let rw = build_risk_weights(&group, &params).unwrap();
/// assert!((rw - 0.16 * 6.0_f64.sqrt()).abs() < 1e-12);
/// ```
pub fn build_risk_weights(
    group: &RiskGroup,
    params: &CalibrationParameters,
) -> Result<f64, ConfigurationError> {
    let class_vrw = params.vega_risk_weight(group.risk_class).ok();
    debug!(
        risk_class = %group.risk_class,
        bucket = %group.label,
        class_vrw = ?class_vrw,
        "Resolved vega risk weight"
    );

    let vrw = params.vega_risk_weight(RiskClass::IR)?;
    let liquidity_horizon = params.liquidity_horizon()?;

    Ok((vrw * liquidity_horizon.sqrt() / BASE_HORIZON_DAYS.sqrt()).min(1.0))
}
