//! In-bucket correlation.
//!
//! IR buckets correlate their maturity × residual-maturity grid through an
//! exponential tenor decay on each axis, joined by a Kronecker product so the
//! matrix follows the row-major layout of `s`. Other risk classes carry no
//! in-bucket decay and correlate through the identity.

use nalgebra::DMatrix;
use simm_core::types::{convert_tenor_to_years, ComputationFault, MarginError, RiskClass};
use simm_core::CalibrationParameters;

use crate::factors::factor_dimension;
use crate::group::RiskGroup;

/// Builds the in-bucket correlation matrix of a group.
///
/// For IR:
///
/// ```text
/// rho[i,j] = exp(-alpha * |y_i - y_j| / min(y_i, y_j))   over maturities
/// fai[i,j]                                             over residual maturities
/// Corr     = min(kron(rho, fai), 1)
/// ```
///
/// For every other class the identity of dimension `len(s)` is returned.
///
/// # Errors
///
/// - `ConfigurationError` when an axis or `IR_Alpha` is missing, or a tenor
///   label cannot be converted.
/// - `ComputationFault::DegenerateDecay` when two distinct tenors meet a zero
///   tenor in the decay denominator.
///
/// # Examples
///
/// ```rust
/// use simm_core::{CalibrationParameters, RiskClass};
/// use simm_vega::correlation::build_in_bucket_correlation;
/// use simm_vega::group::RiskGroup;
///
/// let params = CalibrationParameters::new()
///     .with_ir_axes(["1Y", "2Y"], ["1Y"])
///     .with_ir_constants(0.5, 10.0, 0.2);
/// let group = RiskGroup::new(RiskClass::IR, "USD", vec![]);
///
/// let corr = build_in_bucket_correlation(&group, &params).unwrap();
/// assert_eq!(corr.shape(), (2, 2));
/// assert!((corr[(0, 1)] - (-0.5_f64).exp()).abs() < 1e-12);
/// ```
pub fn build_in_bucket_correlation(
    group: &RiskGroup,
    params: &CalibrationParameters,
) -> Result<DMatrix<f64>, MarginError> {
    if group.risk_class != RiskClass::IR {
        let n = factor_dimension(group, params)?;
        return Ok(DMatrix::identity(n, n));
    }

    let alpha = params.alpha()?;
    let maturities = tenor_years(params.ir_maturities()?)?;
    let residual = tenor_years(params.ir_residual_maturities()?)?;

    let rho = decay_matrix(&maturities, alpha)?;
    let fai = decay_matrix(&residual, alpha)?;

    Ok(rho.kronecker(&fai).map(|c| c.min(1.0)))
}

/// Exponential tenor decay `exp(-alpha * |y_i - y_j| / min(y_i, y_j))`.
///
/// Equal tenors correlate at exactly 1, including two zero tenors.
///
/// # Errors
///
/// `ComputationFault::DegenerateDecay` for distinct tenors whose minimum is 0.
pub fn decay_matrix(years: &[f64], alpha: f64) -> Result<DMatrix<f64>, ComputationFault> {
    let n = years.len();
    let mut m = DMatrix::identity(n, n);

    for i in 0..n {
        for j in (i + 1)..n {
            let (left, right) = (years[i], years[j]);
            let c = if left == right {
                1.0
            } else {
                let floor = left.min(right);
                if floor <= 0.0 {
                    return Err(ComputationFault::DegenerateDecay { left, right });
                }
                (-alpha * (left - right).abs() / floor).exp()
            };
            m[(i, j)] = c;
            m[(j, i)] = c;
        }
    }

    Ok(m)
}

fn tenor_years(labels: &[String]) -> Result<Vec<f64>, MarginError> {
    labels
        .iter()
        .map(|label| convert_tenor_to_years(label).map_err(MarginError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use simm_core::types::{ConfigurationError, NettedSensitivity};

    const TENORS: [&str; 9] = ["2W", "1M", "3M", "6M", "1Y", "2Y", "5Y", "10Y", "30Y"];

    fn ir_group() -> RiskGroup {
        RiskGroup::new(RiskClass::IR, "USD", vec![])
    }

    fn equity_row(qualifier: &str) -> NettedSensitivity {
        NettedSensitivity {
            combination_id: "C1".to_string(),
            risk_type: "Risk_EquityVol".to_string(),
            risk_class: RiskClass::Equity,
            product_class: Some("Equity".to_string()),
            qualifier: Some(qualifier.to_string()),
            bucket: Some("1".to_string()),
            label1: None,
            label2: None,
            label3: None,
            stat_value: 1.0,
            amount_usd: 1.0,
        }
    }

    #[test]
    fn test_single_factor_is_one() {
        let params = CalibrationParameters::new()
            .with_ir_axes(["5Y"], ["0"])
            .with_ir_constants(0.01, 10.0, 0.2);
        let corr = build_in_bucket_correlation(&ir_group(), &params).unwrap();
        assert_eq!(corr, DMatrix::from_element(1, 1, 1.0));
    }

    #[test]
    fn test_kronecker_layout() {
        let params = CalibrationParameters::new()
            .with_ir_axes(["1Y", "2Y"], ["1Y", "3Y"])
            .with_ir_constants(0.3, 10.0, 0.2);
        let corr = build_in_bucket_correlation(&ir_group(), &params).unwrap();

        let rho = (-0.3_f64).exp();
        let fai = (-0.6_f64).exp();
        assert_eq!(corr.shape(), (4, 4));
        // (maturity 0, residual 1) vs (maturity 1, residual 0)
        assert_relative_eq!(corr[(1, 2)], rho * fai, epsilon = 1e-12);
        assert_relative_eq!(corr[(0, 1)], fai, epsilon = 1e-12);
        assert_relative_eq!(corr[(0, 2)], rho, epsilon = 1e-12);
    }

    #[test]
    fn test_decay_degenerate() {
        let err = decay_matrix(&[0.0, 1.0], 0.5).unwrap_err();
        assert_eq!(err, ComputationFault::DegenerateDecay { left: 0.0, right: 1.0 });
    }

    #[test]
    fn test_decay_equal_zero_tenors() {
        let m = decay_matrix(&[0.0, 0.0], 0.5).unwrap();
        assert_eq!(m, DMatrix::from_element(2, 2, 1.0));
    }

    #[test]
    fn test_decay_empty_axis() {
        let m = decay_matrix(&[], 0.5).unwrap();
        assert_eq!(m.shape(), (0, 0));
    }

    #[test]
    fn test_negative_alpha_capped() {
        let params = CalibrationParameters::new()
            .with_ir_axes(["1Y", "2Y"], ["1Y"])
            .with_ir_constants(-1.0, 10.0, 0.2);
        let corr = build_in_bucket_correlation(&ir_group(), &params).unwrap();
        assert_eq!(corr[(0, 1)], 1.0);
    }

    #[test]
    fn test_missing_alpha() {
        let params = CalibrationParameters::new().with_ir_axes(["1Y"], ["1Y"]);
        let err = build_in_bucket_correlation(&ir_group(), &params).unwrap_err();
        assert_eq!(
            err,
            MarginError::Configuration(ConfigurationError::MissingParameter("IR_Alpha"))
        );
    }

    #[test]
    fn test_invalid_tenor_label() {
        let params = CalibrationParameters::new()
            .with_ir_axes(["1Y", "soon"], ["1Y"])
            .with_ir_constants(0.1, 10.0, 0.2);
        let err = build_in_bucket_correlation(&ir_group(), &params).unwrap_err();
        assert!(matches!(
            err,
            MarginError::Configuration(ConfigurationError::InvalidTenor(_))
        ));
    }

    #[test]
    fn test_non_ir_identity() {
        let group = RiskGroup::new(
            RiskClass::Equity,
            "1",
            vec![equity_row("A"), equity_row("B"), equity_row("A")],
        );
        let corr = build_in_bucket_correlation(&group, &CalibrationParameters::new()).unwrap();
        assert_eq!(corr, DMatrix::identity(2, 2));
    }

    fn axis() -> impl Strategy<Value = Vec<&'static str>> {
        proptest::sample::subsequence(TENORS.to_vec(), 1..=TENORS.len())
    }

    proptest! {
        #[test]
        fn prop_ir_correlation_well_formed(
            maturities in axis(),
            residual in axis(),
            alpha in 0.0f64..3.0,
        ) {
            let params = CalibrationParameters::new()
                .with_ir_axes(maturities.clone(), residual.clone())
                .with_ir_constants(alpha, 10.0, 0.2);
            let corr = build_in_bucket_correlation(&ir_group(), &params).unwrap();
            let n = maturities.len() * residual.len();

            prop_assert_eq!(corr.shape(), (n, n));
            for i in 0..n {
                prop_assert_eq!(corr[(i, i)], 1.0);
                for j in 0..n {
                    prop_assert!((corr[(i, j)] - corr[(j, i)]).abs() < 1e-12);
                    prop_assert!(corr[(i, j)] <= 1.0);
                    prop_assert!(corr[(i, j)] >= 0.0);
                }
            }
        }
    }
}
