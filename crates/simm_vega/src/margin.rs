//! Bucket margin aggregation.
//!
//! This module provides:
//! - [`aggregate`]: the quadratic form `K`, net sensitivity `S` and `S_lat`
//! - [`margin_risk_group`]: the full vector / weight / correlation pipeline
//!   for one bucket
//! - [`MarginModel`]: the seam a margin type plugs into, with [`VegaMargin`]
//!   as the vega implementation

use nalgebra::{DMatrix, DVector};
use simm_core::types::{ComputationFault, MarginError, NettedSensitivity, RiskClass, SensitivityRecord};
use simm_core::CalibrationParameters;
use tracing::info;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::correlation::build_in_bucket_correlation;
use crate::factors::build_risk_factors;
use crate::group::RiskGroup;
use crate::netting;
use crate::weights::build_risk_weights;

/// Relative tolerance below zero accepted for the quadratic form.
const QUADRATIC_TOLERANCE: f64 = 1e-10;

/// Margin of one bucket for one (CombinationID, RiskType, RiskClass) identity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MarginResult {
    /// Portfolio combination.
    #[cfg_attr(feature = "serde", serde(rename = "CombinationID"))]
    pub combination_id: String,
    /// Risk type.
    #[cfg_attr(feature = "serde", serde(rename = "RiskType"))]
    pub risk_type: String,
    /// Risk class.
    #[cfg_attr(feature = "serde", serde(rename = "RiskClass"))]
    pub risk_class: RiskClass,
    /// Bucket margin, `K >= 0`.
    #[cfg_attr(feature = "serde", serde(rename = "K"))]
    pub k: f64,
    /// Net weighted sensitivity.
    #[cfg_attr(feature = "serde", serde(rename = "S"))]
    pub s: f64,
    /// `S` clipped into `[-K, K]`.
    #[cfg_attr(feature = "serde", serde(rename = "S_lat"))]
    pub s_lat: f64,
    /// Bucket, or risk type for FX.
    #[cfg_attr(feature = "serde", serde(rename = "Group"))]
    pub group: String,
}

/// The `(K, S, S_lat)` triple of a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BucketMargin {
    /// `sqrt(max(WSᵀ · Corr · WS, 0))`
    pub k: f64,
    /// `Σ WS`
    pub s: f64,
    /// `clip(S, -K, K)`
    pub s_lat: f64,
}

/// Clips a net sensitivity into `[-k, k]`.
#[inline]
pub fn latitude(s: f64, k: f64) -> f64 {
    s.min(k).max(-k)
}

/// Aggregates weighted sensitivities under a correlation matrix.
///
/// # Errors
///
/// - `DimensionMismatch` when `corr` is not square of order `len(ws)`.
/// - `NonFinite` when the quadratic form is NaN or infinite.
/// - `NegativeQuadraticForm` when `WSᵀ · Corr · WS` is below
///   `-1e-10 × max(‖WS‖², 1)`. Smaller negatives are rounding noise and
///   clamp to zero.
///
/// # Examples
///
/// ```rust
/// use nalgebra::{DMatrix, DVector};
/// use simm_vega::margin::aggregate;
///
/// let ws = DVector::from_vec(vec![3.0, -4.0]);
/// let margin = aggregate(&ws, &DMatrix::identity(2, 2)).unwrap();
///
/// assert_eq!(margin.k, 5.0);
/// assert_eq!(margin.s, -1.0);
/// assert_eq!(margin.s_lat, -1.0);
/// ```
pub fn aggregate(ws: &DVector<f64>, corr: &DMatrix<f64>) -> Result<BucketMargin, ComputationFault> {
    let n = ws.len();
    if corr.nrows() != n || corr.ncols() != n {
        return Err(ComputationFault::DimensionMismatch {
            vector: n,
            matrix: corr.nrows(),
        });
    }

    let quad = ws.dot(&(corr * ws));
    if !quad.is_finite() {
        return Err(ComputationFault::NonFinite("quadratic form".to_string()));
    }
    if quad < -QUADRATIC_TOLERANCE * ws.norm_squared().max(1.0) {
        return Err(ComputationFault::NegativeQuadraticForm(quad));
    }

    let k = quad.max(0.0).sqrt();
    let s = ws.sum();
    Ok(BucketMargin {
        k,
        s,
        s_lat: latitude(s, k),
    })
}

/// Computes the margin of one bucket.
///
/// Builds `s`, the risk weight and the in-bucket correlation, aggregates
/// `WS = RW × s` and stamps the triple on every distinct RiskType of the
/// group's combination, in first-seen order. An empty group yields no rows.
///
/// # Errors
///
/// Any `SchemaError`, `ConfigurationError` or `ComputationFault` raised on
/// the way, unchanged. A group mixing combinations is
/// `SchemaError::MixedCombination`.
pub fn margin_risk_group(
    group: &RiskGroup,
    params: &CalibrationParameters,
) -> Result<Vec<MarginResult>, MarginError> {
    info!("Calculate {} Vega Margin for {}", group.risk_class, group.label);
    group.validate()?;

    let s = build_risk_factors(group, params)?;
    let rw = build_risk_weights(group, params)?;
    let corr = build_in_bucket_correlation(group, params)?;
    let margin = aggregate(&(s * rw), &corr)?;

    Ok(identities(&group.rows)
        .into_iter()
        .map(|(combination_id, risk_type)| MarginResult {
            combination_id: combination_id.to_string(),
            risk_type: risk_type.to_string(),
            risk_class: group.risk_class,
            k: margin.k,
            s: margin.s,
            s_lat: margin.s_lat,
            group: group.label.clone(),
        })
        .collect())
}

/// Distinct (CombinationID, RiskType) pairs in first-seen order.
fn identities(rows: &[NettedSensitivity]) -> Vec<(&str, &str)> {
    let mut seen: Vec<(&str, &str)> = Vec::new();
    for row in rows {
        let id = (row.combination_id.as_str(), row.risk_type.as_str());
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// A margin type: how raw sensitivities are netted and how a bucket is margined.
///
/// Implementations must be pure so buckets can be margined concurrently.
pub trait MarginModel: Sync {
    /// Name of the margin type (e.g. `"Vega"`).
    fn margin_type(&self) -> &'static str;

    /// Nets a homogeneous risk-class working set.
    fn net_sensitivities(
        &self,
        records: &[SensitivityRecord],
        params: &CalibrationParameters,
    ) -> Result<Vec<NettedSensitivity>, MarginError>;

    /// Margins one bucket of netted rows.
    fn margin_risk_group(
        &self,
        group: &RiskGroup,
        params: &CalibrationParameters,
    ) -> Result<Vec<MarginResult>, MarginError>;
}

/// Vega margin.
#[derive(Debug, Clone, Copy, Default)]
pub struct VegaMargin;

impl VegaMargin {
    /// Creates the vega margin model.
    pub fn new() -> Self {
        Self
    }
}

impl MarginModel for VegaMargin {
    fn margin_type(&self) -> &'static str {
        "Vega"
    }

    fn net_sensitivities(
        &self,
        records: &[SensitivityRecord],
        params: &CalibrationParameters,
    ) -> Result<Vec<NettedSensitivity>, MarginError> {
        netting::net_sensitivities(records, params)
    }

    fn margin_risk_group(
        &self,
        group: &RiskGroup,
        params: &CalibrationParameters,
    ) -> Result<Vec<MarginResult>, MarginError> {
        margin_risk_group(group, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use simm_core::types::{ConfigurationError, SchemaError};

    fn ir_row(combination_id: &str, label2: &str, label3: &str, value: f64) -> NettedSensitivity {
        typed_ir_row(combination_id, "Risk_IRVol", label2, label3, value)
    }

    fn typed_ir_row(
        combination_id: &str,
        risk_type: &str,
        label2: &str,
        label3: &str,
        value: f64,
    ) -> NettedSensitivity {
        NettedSensitivity {
            combination_id: combination_id.to_string(),
            risk_type: risk_type.to_string(),
            risk_class: RiskClass::IR,
            product_class: None,
            qualifier: None,
            bucket: Some("USD".to_string()),
            label1: None,
            label2: Some(label2.to_string()),
            label3: Some(label3.to_string()),
            stat_value: value,
            amount_usd: 0.0,
        }
    }

    fn single_factor_params() -> CalibrationParameters {
        CalibrationParameters::new()
            .with_ir_axes(["5Y"], ["0"])
            .with_ir_constants(0.01, 60.0, 0.16)
    }

    #[test]
    fn test_single_ir_factor() {
        let params = single_factor_params();
        let group = RiskGroup::new(RiskClass::IR, "USD", vec![ir_row("C1", "5Y", "0", 100.0)]);
        let rw = build_risk_weights(&group, &params).unwrap();

        let results = margin_risk_group(&group, &params).unwrap();
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_relative_eq!(result.k, rw * 100.0, epsilon = 1e-9);
        assert_relative_eq!(result.s, result.k, epsilon = 1e-9);
        assert_relative_eq!(result.s_lat, result.k, epsilon = 1e-9);
        assert_eq!(result.group, "USD");
        assert_eq!(result.combination_id, "C1");
        assert_eq!(result.risk_class, RiskClass::IR);
    }

    #[test]
    fn test_empty_group() {
        let group = RiskGroup::new(RiskClass::IR, "USD", vec![]);
        let results = margin_risk_group(&group, &single_factor_params()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_zero_length_and_all_zero() {
        let margin = aggregate(&DVector::zeros(0), &DMatrix::zeros(0, 0)).unwrap();
        assert_eq!(margin, BucketMargin::default());

        let margin = aggregate(&DVector::zeros(3), &DMatrix::identity(3, 3)).unwrap();
        assert_eq!(margin, BucketMargin::default());
    }

    #[test]
    fn test_one_row_per_risk_type() {
        let params = single_factor_params();
        let group = RiskGroup::new(
            RiskClass::IR,
            "USD",
            vec![
                typed_ir_row("C1", "Risk_InflationVol", "5Y", "0", 10.0),
                typed_ir_row("C1", "Risk_IRVol", "5Y", "0", 30.0),
            ],
        );
        let rw = build_risk_weights(&group, &params).unwrap();

        let results = margin_risk_group(&group, &params).unwrap();
        let types: Vec<&str> = results.iter().map(|r| r.risk_type.as_str()).collect();
        assert_eq!(types, vec!["Risk_InflationVol", "Risk_IRVol"]);
        assert!(results.iter().all(|r| r.combination_id == "C1"));
        assert_relative_eq!(results[0].k, rw * 40.0, epsilon = 1e-9);
        assert_eq!(results[0].k, results[1].k);
    }

    #[test]
    fn test_mixed_combination_group_rejected() {
        let group = RiskGroup::new(
            RiskClass::IR,
            "USD",
            vec![ir_row("C1", "5Y", "0", 100.0), ir_row("C2", "5Y", "0", 300.0)],
        );
        let err = margin_risk_group(&group, &single_factor_params()).unwrap_err();
        assert!(matches!(
            err,
            MarginError::Schema(SchemaError::MixedCombination { row: 1, .. })
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = aggregate(&DVector::zeros(2), &DMatrix::identity(3, 3)).unwrap_err();
        assert_eq!(err, ComputationFault::DimensionMismatch { vector: 2, matrix: 3 });
    }

    #[test]
    fn test_negative_quadratic_form() {
        let corr = DMatrix::from_row_slice(2, 2, &[1.0, -2.0, -2.0, 1.0]);
        let ws = DVector::from_vec(vec![1.0, 1.0]);
        let err = aggregate(&ws, &corr).unwrap_err();
        assert_eq!(err, ComputationFault::NegativeQuadraticForm(-2.0));
    }

    #[test]
    fn test_rounding_noise_clamped() {
        let corr = DMatrix::from_row_slice(1, 1, &[-1e-14]);
        let ws = DVector::from_vec(vec![1.0]);
        let margin = aggregate(&ws, &corr).unwrap();
        assert_eq!(margin.k, 0.0);
        assert_eq!(margin.s_lat, 0.0);
    }

    #[test]
    fn test_non_finite() {
        let ws = DVector::from_vec(vec![f64::INFINITY]);
        let err = aggregate(&ws, &DMatrix::identity(1, 1)).unwrap_err();
        assert!(matches!(err, ComputationFault::NonFinite(_)));
    }

    #[test]
    fn test_errors_propagate() {
        let group = RiskGroup::new(RiskClass::IR, "USD", vec![ir_row("C1", "5Y", "0", 1.0)]);
        let err = margin_risk_group(&group, &CalibrationParameters::new()).unwrap_err();
        assert_eq!(
            err,
            MarginError::Configuration(ConfigurationError::MissingParameter("IR_Vega_Maturity"))
        );

        let mut mixed = group.clone();
        mixed.risk_class = RiskClass::FX;
        let err = margin_risk_group(&mixed, &single_factor_params()).unwrap_err();
        assert!(matches!(err, MarginError::Schema(SchemaError::MixedRiskClass { .. })));
    }

    #[test]
    fn test_vega_model() {
        let model = VegaMargin::new();
        assert_eq!(model.margin_type(), "Vega");

        let group = RiskGroup::new(RiskClass::IR, "USD", vec![ir_row("C1", "5Y", "0", 100.0)]);
        let params = single_factor_params();
        assert_eq!(
            model.margin_risk_group(&group, &params).unwrap(),
            margin_risk_group(&group, &params).unwrap()
        );
    }

    proptest! {
        #[test]
        fn prop_clip_law(values in proptest::collection::vec(-1e6f64..1e6, 0..12), rho in 0.0f64..1.0) {
            let n = values.len();
            // uniform correlation is positive semi-definite for rho in [0, 1]
            let corr = DMatrix::from_fn(n, n, |i, j| if i == j { 1.0 } else { rho });
            let margin = aggregate(&DVector::from_vec(values), &corr).unwrap();

            prop_assert!(margin.k >= 0.0);
            prop_assert_eq!(margin.s_lat, margin.s.min(margin.k).max(-margin.k));
            if margin.k == 0.0 {
                prop_assert_eq!(margin.s_lat, 0.0);
            }
        }
    }
}
