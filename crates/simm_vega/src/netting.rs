//! Sensitivity netting.
//!
//! Converts raw vega sensitivities into price sensitivities, applies the
//! Equity / Commodity / FX weighting and nets rows that share the risk factor
//! key of their risk class.
//!
//! | Risk class | Grouping key |
//! |------------|--------------|
//! | IR | CombinationID, RiskType, Bucket, Label2, Label3, RiskClass |
//! | FX | CombinationID, ProductClass, RiskType, Qualifier, Label1, RiskClass |
//! | CreditQ, CreditNonQ | CombinationID, ProductClass, RiskType, Qualifier, Bucket, Label1, RiskClass |
//! | Equity, Commodity | CombinationID, ProductClass, RiskType, Qualifier, Bucket, RiskClass |

use std::collections::{BTreeMap, HashMap};

use simm_core::types::{
    ComputationFault, MarginError, NettedSensitivity, RiskClass, SchemaError, SensitivityRecord,
};
use simm_core::CalibrationParameters;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

/// Confidence level of the source horizon.
const SOURCE_CONFIDENCE: f64 = 0.99;

/// Days per year over the two-week margin period.
const HORIZON_DAYS_RATIO: f64 = 365.0 / 14.0;

/// Returns `sqrt(365/14) / Φ⁻¹(0.99)`.
///
/// Rescales a 99% two-week quantile into the horizon convention the
/// downstream aggregation expects.
///
/// # Examples
///
/// ```rust
/// use simm_vega::netting::vega_horizon_scale;
///
/// let scale = vega_horizon_scale().unwrap();
/// assert!((scale - 2.194865).abs() < 1e-6);
/// ```
pub fn vega_horizon_scale() -> Result<f64, ComputationFault> {
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| ComputationFault::Distribution(e.to_string()))?;
    Ok(HORIZON_DAYS_RATIO.sqrt() / normal.inverse_cdf(SOURCE_CONFIDENCE))
}

/// Risk factor key of a netted row.
///
/// Fields outside the key of the risk class stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FactorKey {
    combination_id: String,
    risk_type: String,
    risk_class: RiskClass,
    product_class: Option<String>,
    qualifier: Option<String>,
    bucket: Option<String>,
    label1: Option<String>,
    label2: Option<String>,
    label3: Option<String>,
}

impl FactorKey {
    fn from_record(record: &SensitivityRecord, row: usize) -> Result<Self, SchemaError> {
        let risk_class = record.risk_class;
        let field = |value: &Option<String>, name: &'static str| {
            value.clone().map(Some).ok_or(SchemaError::MissingField {
                field: name,
                risk_class,
                row,
            })
        };

        let mut key = FactorKey {
            combination_id: record.combination_id.clone(),
            risk_type: record.risk_type.clone(),
            risk_class,
            product_class: None,
            qualifier: None,
            bucket: None,
            label1: None,
            label2: None,
            label3: None,
        };

        match risk_class {
            RiskClass::IR => {
                key.bucket = field(&record.bucket, "Bucket")?;
                key.label2 = field(&record.label2, "Label2")?;
                key.label3 = field(&record.label3, "Label3")?;
            }
            RiskClass::FX => {
                key.product_class = field(&record.product_class, "ProductClass")?;
                key.qualifier = field(&record.qualifier, "Qualifier")?;
                key.label1 = field(&record.label1, "Label1")?;
            }
            RiskClass::CreditQ | RiskClass::CreditNonQ => {
                key.product_class = field(&record.product_class, "ProductClass")?;
                key.qualifier = field(&record.qualifier, "Qualifier")?;
                key.bucket = field(&record.bucket, "Bucket")?;
                key.label1 = field(&record.label1, "Label1")?;
            }
            RiskClass::Equity | RiskClass::Commodity => {
                key.product_class = field(&record.product_class, "ProductClass")?;
                key.qualifier = field(&record.qualifier, "Qualifier")?;
                key.bucket = field(&record.bucket, "Bucket")?;
            }
        }

        Ok(key)
    }

    fn into_netted(self, stat_value: f64, amount_usd: f64) -> NettedSensitivity {
        NettedSensitivity {
            combination_id: self.combination_id,
            risk_type: self.risk_type,
            risk_class: self.risk_class,
            product_class: self.product_class,
            qualifier: self.qualifier,
            bucket: self.bucket,
            label1: self.label1,
            label2: self.label2,
            label3: self.label3,
            stat_value,
            amount_usd,
        }
    }
}

/// Weighting applied to `AmountUSD` before netting.
enum AmountWeighting<'a> {
    /// IR and credit amounts are left as supplied.
    Unweighted,
    /// Equity / Commodity: per-bucket weight, inner-joined on `Bucket`.
    Bucket(&'a BTreeMap<String, f64>, f64),
    /// FX: one scalar weight.
    Scalar(f64),
}

impl<'a> AmountWeighting<'a> {
    fn resolve(
        risk_class: RiskClass,
        params: &'a CalibrationParameters,
    ) -> Result<Self, MarginError> {
        Ok(match risk_class {
            RiskClass::Equity | RiskClass::Commodity => {
                AmountWeighting::Bucket(params.bucket_weights(risk_class)?, vega_horizon_scale()?)
            }
            RiskClass::FX => AmountWeighting::Scalar(params.fx_weight()? * vega_horizon_scale()?),
            RiskClass::IR | RiskClass::CreditQ | RiskClass::CreditNonQ => AmountWeighting::Unweighted,
        })
    }

    /// Returns the weighted amount, or `None` when the bucket has no weight.
    fn apply(&self, record: &SensitivityRecord, row: usize) -> Result<Option<f64>, SchemaError> {
        match self {
            AmountWeighting::Unweighted => Ok(Some(record.amount_usd)),
            AmountWeighting::Scalar(factor) => Ok(Some(record.amount_usd * factor)),
            AmountWeighting::Bucket(table, scale) => {
                let bucket = record.bucket.as_deref().ok_or(SchemaError::MissingField {
                    field: "Bucket",
                    risk_class: record.risk_class,
                    row,
                })?;
                Ok(table
                    .get(bucket)
                    .map(|weight| record.amount_usd * weight * scale))
            }
        }
    }
}

/// Nets a homogeneous risk-class working set.
///
/// Every `Stat_Value` is multiplied by its `ImpliedVol`. Equity and
/// Commodity amounts are weighted by their bucket weight (rows whose bucket
/// has no weight are dropped), FX amounts by the scalar FX weight, both times
/// [`vega_horizon_scale`]. Rows are then summed per risk factor key. Output
/// rows follow the first-seen order of their key.
///
/// # Errors
///
/// - `SchemaError` when the set mixes risk classes, a key field is missing
///   or a numeric field is not finite.
/// - `ConfigurationError` when the weight table or scalar of the class is absent.
///
/// # Examples
///
/// ```rust
/// use simm_core::{CalibrationParameters, RiskClass, SensitivityRecord};
/// use simm_vega::netting::net_sensitivities;
///
/// let record = |value| {
///     SensitivityRecord::new("C1", "Risk_IRVol", RiskClass::IR)
///         .with_bucket("USD")
///         .with_labels(None, Some("5Y"), Some("1Y"))
///         .with_values(0.5, value, value)
/// };
///
/// let netted = net_sensitivities(&[record(10.0), record(30.0)], &CalibrationParameters::new()).unwrap();
/// assert_eq!(netted.len(), 1);
/// assert_eq!(netted[0].stat_value, 20.0);
/// ```
pub fn net_sensitivities(
    records: &[SensitivityRecord],
    params: &CalibrationParameters,
) -> Result<Vec<NettedSensitivity>, MarginError> {
    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    let risk_class = first.risk_class;

    if let Some((row, record)) = records
        .iter()
        .enumerate()
        .find(|(_, r)| r.risk_class != risk_class)
    {
        return Err(SchemaError::MixedRiskClass {
            expected: risk_class,
            found: record.risk_class,
            row,
        }
        .into());
    }

    let weighting = AmountWeighting::resolve(risk_class, params)?;

    let mut positions: HashMap<FactorKey, usize> = HashMap::new();
    let mut keys: Vec<FactorKey> = Vec::new();
    let mut sums: Vec<(f64, f64)> = Vec::new();

    for (row, record) in records.iter().enumerate() {
        check_finite(record, row)?;

        let Some(amount_usd) = weighting.apply(record, row)? else {
            warn!(
                row,
                bucket = record.bucket.as_deref().unwrap_or(""),
                "No {} weight for bucket, dropping sensitivity",
                risk_class
            );
            continue;
        };
        let stat_value = record.stat_value * record.implied_vol;
        let key = FactorKey::from_record(record, row)?;

        match positions.get(&key) {
            Some(&idx) => {
                sums[idx].0 += stat_value;
                sums[idx].1 += amount_usd;
            }
            None => {
                positions.insert(key.clone(), keys.len());
                keys.push(key);
                sums.push((stat_value, amount_usd));
            }
        }
    }

    debug!(
        risk_class = %risk_class,
        input_rows = records.len(),
        netted_rows = keys.len(),
        "Netted vega sensitivities"
    );

    Ok(keys
        .into_iter()
        .zip(sums)
        .map(|(key, (stat_value, amount_usd))| key.into_netted(stat_value, amount_usd))
        .collect())
}

fn check_finite(record: &SensitivityRecord, row: usize) -> Result<(), SchemaError> {
    let fields = [
        ("ImpliedVol", record.implied_vol),
        ("Stat_Value", record.stat_value),
        ("AmountUSD", record.amount_usd),
    ];
    match fields.into_iter().find(|(_, value)| !value.is_finite()) {
        Some((field, _)) => Err(SchemaError::NonFinite { field, row }),
        None => Ok(()),
    }
}
