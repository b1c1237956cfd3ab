//! Sensitivity vector construction.

use nalgebra::DVector;
use simm_core::types::{ConfigurationError, NettedSensitivity, RiskClass};
use simm_core::CalibrationParameters;
use tracing::debug;

use super::indexer::{find_factor_idx, find_factor_idx_1d};
use crate::group::RiskGroup;

/// Returns the length of `s` for a group.
///
/// Depends only on the axis cardinalities of the risk class and, for the
/// qualifier-based layouts, on the number of distinct qualifiers in the group.
pub fn factor_dimension(
    group: &RiskGroup,
    params: &CalibrationParameters,
) -> Result<usize, ConfigurationError> {
    Ok(match group.risk_class {
        RiskClass::IR => params.ir_maturities()?.len() * params.ir_residual_maturities()?.len(),
        RiskClass::CreditQ | RiskClass::CreditNonQ => {
            group.qualifiers_in_order().len() * params.credit_tenors(group.risk_class)?.len()
        }
        RiskClass::Equity | RiskClass::Commodity | RiskClass::FX => {
            group.qualifiers_in_order().len()
        }
    })
}

/// Builds the fully materialised sensitivity vector `s` of a group.
///
/// IR slots receive the netted `Stat_Value`; every other class writes
/// `AmountUSD`. Rows whose labels are not on the calibration axes are dropped
/// and their slot stays zero. A slot hit by several netted rows holds their
/// sum, so an FX pair quoted at several tenors keeps its whole exposure.
///
/// # Errors
///
/// `ConfigurationError::MissingParameter` when the tenor axis of the class is
/// absent.
///
/// # Examples
///
/// ```rust
/// use simm_core::{CalibrationParameters, NettedSensitivity, RiskClass};
/// use simm_vega::factors::build_risk_factors;
/// use simm_vega::group::RiskGroup;
///
/// let params = CalibrationParameters::new().with_ir_axes(["1Y", "5Y"], ["0", "1Y"]);
/// let row = NettedSensitivity {
///     combination_id: "C1".into(),
///     risk_type: "Risk_IRVol".into(),
///     risk_class: RiskClass::IR,
///     product_class: None,
///     qualifier: None,
///     bucket: Some("USD".into()),
///     label1: None,
///     label2: Some("5Y".into()),
///     label3: Some("0".into()),
///     stat_value: 42.0,
///     amount_usd: 0.0,
/// };
/// let group = RiskGroup::new(RiskClass::IR, "USD", vec![row]);
///
/// let s = build_risk_factors(&group, &params).unwrap();
/// assert_eq!(s.as_slice(), &[0.0, 0.0, 42.0, 0.0]);
/// ```
pub fn build_risk_factors(
    group: &RiskGroup,
    params: &CalibrationParameters,
) -> Result<DVector<f64>, ConfigurationError> {
    let mut s = DVector::zeros(factor_dimension(group, params)?);

    match group.risk_class {
        RiskClass::IR => {
            let maturities = params.ir_maturities()?;
            let residual = params.ir_residual_maturities()?;
            for row in &group.rows {
                let idx = match (row.label2.as_deref(), row.label3.as_deref()) {
                    (Some(maturity), Some(underlying)) => {
                        find_factor_idx(maturity, underlying, maturities, residual)
                    }
                    _ => None,
                };
                write_slot(&mut s, idx, row.stat_value, row);
            }
        }
        RiskClass::CreditQ | RiskClass::CreditNonQ => {
            let tenors = params.credit_tenors(group.risk_class)?;
            let qualifiers = group.qualifiers_sorted();
            for row in &group.rows {
                let idx = match (row.qualifier.as_deref(), row.label1.as_deref()) {
                    (Some(qualifier), Some(tenor)) => {
                        find_factor_idx(qualifier, tenor, &qualifiers, tenors)
                    }
                    _ => None,
                };
                write_slot(&mut s, idx, row.amount_usd, row);
            }
        }
        RiskClass::Equity | RiskClass::Commodity | RiskClass::FX => {
            let qualifiers = group.qualifiers_in_order();
            for row in &group.rows {
                let idx = row
                    .qualifier
                    .as_deref()
                    .and_then(|qualifier| find_factor_idx_1d(qualifier, &qualifiers));
                write_slot(&mut s, idx, row.amount_usd, row);
            }
        }
    }

    Ok(s)
}

fn write_slot(s: &mut DVector<f64>, idx: Option<usize>, value: f64, row: &NettedSensitivity) {
    match idx {
        Some(i) => s[i] += value,
        None => debug!(
            risk_class = %row.risk_class,
            qualifier = row.qualifier.as_deref().unwrap_or(""),
            label1 = row.label1.as_deref().unwrap_or(""),
            label2 = row.label2.as_deref().unwrap_or(""),
            label3 = row.label3.as_deref().unwrap_or(""),
            "Risk factor not on calibration axes, dropping"
        ),
    }
}
