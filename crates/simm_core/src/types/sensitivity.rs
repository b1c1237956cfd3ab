//! Sensitivity rows.
//!
//! [`SensitivityRecord`] is one raw observation of a position against a risk
//! factor, as supplied by the upstream loader. [`NettedSensitivity`] is the
//! result of netting records that share a risk-class specific factor key.

use serde::{Deserialize, Serialize};

use super::risk_class::RiskClass;

/// One position / risk-factor observation.
///
/// Column names follow the upstream CRIF-style extract, so the serde names
/// are kept verbatim. Blank label cells deserialize to `None`.
///
/// # Examples
///
/// ```rust
/// use simm_core::types::{RiskClass, SensitivityRecord};
///
/// let record = SensitivityRecord::new("C1", "Risk_IRVol", RiskClass::IR)
///     .with_bucket("USD")
///     .with_labels(None, Some("5Y"), Some("1Y"))
///     .with_values(0.25, 400.0, 400.0);
///
/// assert_eq!(record.bucket.as_deref(), Some("USD"));
/// assert_eq!(record.label2.as_deref(), Some("5Y"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRecord {
    /// Portfolio combination the position belongs to.
    #[serde(rename = "CombinationID")]
    pub combination_id: String,

    /// Risk type (e.g. `Risk_IRVol`, `Risk_FXVol`).
    #[serde(rename = "RiskType")]
    pub risk_type: String,

    /// Risk class; homogeneous within a working set.
    #[serde(rename = "RiskClass")]
    pub risk_class: RiskClass,

    /// Product class (e.g. `RatesFX`, `Credit`).
    #[serde(rename = "ProductClass", default)]
    pub product_class: Option<String>,

    /// Issuer, currency pair, index or other qualifier.
    #[serde(rename = "Qualifier", default)]
    pub qualifier: Option<String>,

    /// Risk-class specific bucket.
    #[serde(rename = "Bucket", default)]
    pub bucket: Option<String>,

    /// First label (credit tenor, FX option tenor).
    #[serde(rename = "Label1", default)]
    pub label1: Option<String>,

    /// Second label (IR option maturity).
    #[serde(rename = "Label2", default)]
    pub label2: Option<String>,

    /// Third label (IR residual maturity of the underlying).
    #[serde(rename = "Label3", default)]
    pub label3: Option<String>,

    /// Implied volatility used to turn a vega into a price sensitivity.
    #[serde(rename = "ImpliedVol")]
    pub implied_vol: f64,

    /// Raw sensitivity.
    #[serde(rename = "Stat_Value")]
    pub stat_value: f64,

    /// Sensitivity after USD / notional scaling.
    #[serde(rename = "AmountUSD")]
    pub amount_usd: f64,
}

impl SensitivityRecord {
    /// Creates a record with the mandatory identity and zeroed values.
    pub fn new(
        combination_id: impl Into<String>,
        risk_type: impl Into<String>,
        risk_class: RiskClass,
    ) -> Self {
        Self {
            combination_id: combination_id.into(),
            risk_type: risk_type.into(),
            risk_class,
            product_class: None,
            qualifier: None,
            bucket: None,
            label1: None,
            label2: None,
            label3: None,
            implied_vol: 1.0,
            stat_value: 0.0,
            amount_usd: 0.0,
        }
    }

    /// Sets the product class.
    pub fn with_product_class(mut self, product_class: impl Into<String>) -> Self {
        self.product_class = Some(product_class.into());
        self
    }

    /// Sets the qualifier.
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Sets the bucket.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Sets the three labels.
    pub fn with_labels(
        mut self,
        label1: Option<&str>,
        label2: Option<&str>,
        label3: Option<&str>,
    ) -> Self {
        self.label1 = label1.map(str::to_string);
        self.label2 = label2.map(str::to_string);
        self.label3 = label3.map(str::to_string);
        self
    }

    /// Sets implied volatility, raw sensitivity and USD amount.
    pub fn with_values(mut self, implied_vol: f64, stat_value: f64, amount_usd: f64) -> Self {
        self.implied_vol = implied_vol;
        self.stat_value = stat_value;
        self.amount_usd = amount_usd;
        self
    }
}

/// One netted risk factor row.
///
/// Only the fields that make up the grouping key of the risk class are
/// populated; the remaining label fields are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NettedSensitivity {
    /// Portfolio combination.
    pub combination_id: String,
    /// Risk type.
    pub risk_type: String,
    /// Risk class.
    pub risk_class: RiskClass,
    /// Product class (FX, credit, equity, commodity keys).
    pub product_class: Option<String>,
    /// Qualifier (FX, credit, equity, commodity keys).
    pub qualifier: Option<String>,
    /// Bucket (every key except FX).
    pub bucket: Option<String>,
    /// First label (FX and credit keys).
    pub label1: Option<String>,
    /// Second label (IR key).
    pub label2: Option<String>,
    /// Third label (IR key).
    pub label3: Option<String>,
    /// Summed vol-scaled sensitivity.
    pub stat_value: f64,
    /// Summed weighted USD amount.
    pub amount_usd: f64,
}

impl NettedSensitivity {
    /// Returns the margin group label: the bucket, or the risk type for FX.
    pub fn group_label(&self) -> Option<&str> {
        if self.risk_class.groups_by_bucket() {
            self.bucket.as_deref()
        } else {
            Some(self.risk_type.as_str())
        }
    }

    /// Re-expresses the netted row as a raw record with unit implied vol.
    pub fn to_record(&self) -> SensitivityRecord {
        SensitivityRecord {
            combination_id: self.combination_id.clone(),
            risk_type: self.risk_type.clone(),
            risk_class: self.risk_class,
            product_class: self.product_class.clone(),
            qualifier: self.qualifier.clone(),
            bucket: self.bucket.clone(),
            label1: self.label1.clone(),
            label2: self.label2.clone(),
            label3: self.label3.clone(),
            implied_vol: 1.0,
            stat_value: self.stat_value,
            amount_usd: self.amount_usd,
        }
    }
}
