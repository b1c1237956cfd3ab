//! Calibration parameter bundle.
//!
//! [`CalibrationParameters`] carries the weight tables, tenor axes and
//! constants consumed by the Vega margin core. It is loaded once (usually from
//! a TOML file) and shared read-only across every bucket computation.
//!
//! Every entry is optional at load time. The component that needs an entry
//! asks for it through one of the `require`-style accessors, which fail with
//! [`ConfigurationError::MissingParameter`] naming the absent entry.
//!
//! # File format
//!
//! ```toml
//! IR_Vega_Maturity = ["2W", "1M", "3M", "6M", "1Y", "2Y", "3Y", "5Y", "10Y", "15Y", "20Y", "30Y"]
//! IR_Vega_Residual_Maturity = ["2W", "1M", "3M", "6M", "1Y", "2Y", "3Y", "5Y", "10Y", "15Y", "20Y", "30Y"]
//! IR_Alpha = 0.01
//! IR_LH = 60.0
//! IR_VRW = 0.16
//! FX_Weights = 0.3
//!
//! [Equity_Weights]
//! "1" = 0.28
//! "2" = 0.28
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{convert_tenor_to_years, ConfigurationError, RiskClass};

/// Read-only calibration bundle for Vega margin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParameters {
    /// Equity bucket → weight.
    #[serde(rename = "Equity_Weights")]
    pub equity_weights: Option<BTreeMap<String, f64>>,

    /// Commodity bucket → weight.
    #[serde(rename = "Commodity_Weights")]
    pub commodity_weights: Option<BTreeMap<String, f64>>,

    /// Scalar FX weight.
    #[serde(rename = "FX_Weights")]
    pub fx_weights: Option<f64>,

    /// IR option maturity axis.
    #[serde(rename = "IR_Vega_Maturity")]
    pub ir_vega_maturity: Option<Vec<String>>,

    /// IR residual maturity axis.
    #[serde(rename = "IR_Vega_Residual_Maturity")]
    pub ir_vega_residual_maturity: Option<Vec<String>>,

    /// Qualifying credit tenor axis.
    #[serde(rename = "CreditQ_Tenor")]
    pub creditq_tenor: Option<Vec<String>>,

    /// Non-qualifying credit tenor axis.
    #[serde(rename = "CreditNonQ_Tenor")]
    pub creditnonq_tenor: Option<Vec<String>>,

    /// IR correlation decay.
    #[serde(rename = "IR_Alpha")]
    pub ir_alpha: Option<f64>,

    /// IR liquidity horizon (days).
    #[serde(rename = "IR_LH")]
    pub ir_lh: Option<f64>,

    /// IR vega risk weight.
    #[serde(rename = "IR_VRW")]
    pub ir_vrw: Option<f64>,

    /// Qualifying credit vega risk weight.
    #[serde(rename = "CreditQ_VRW")]
    pub creditq_vrw: Option<f64>,

    /// Non-qualifying credit vega risk weight.
    #[serde(rename = "CreditNonQ_VRW")]
    pub creditnonq_vrw: Option<f64>,

    /// Equity vega risk weight.
    #[serde(rename = "Equity_VRW")]
    pub equity_vrw: Option<f64>,

    /// Commodity vega risk weight.
    #[serde(rename = "Commodity_VRW")]
    pub commodity_vrw: Option<f64>,

    /// FX vega risk weight.
    #[serde(rename = "FX_VRW")]
    pub fx_vrw: Option<f64>,
}

impl CalibrationParameters {
    /// Creates an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a bundle from TOML text and validates it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        let params: CalibrationParameters = toml::from_str(content)
            .map_err(|e| ConfigurationError::FileError(format!("Failed to parse TOML: {}", e)))?;

        params.validate()?;
        Ok(params)
    }

    /// Loads a bundle from a TOML file and validates it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::FileError(format!(
                "Failed to read calibration file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Checks every present entry.
    ///
    /// Tenor labels must convert to year fractions and every scalar or table
    /// weight must be finite. Absent entries are not an error here.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let axes = [
            &self.ir_vega_maturity,
            &self.ir_vega_residual_maturity,
            &self.creditq_tenor,
            &self.creditnonq_tenor,
        ];
        for axis in axes.into_iter().flatten() {
            for label in axis {
                convert_tenor_to_years(label)?;
            }
        }

        let scalars = [
            ("FX_Weights", self.fx_weights),
            ("IR_Alpha", self.ir_alpha),
            ("IR_LH", self.ir_lh),
            ("IR_VRW", self.ir_vrw),
            ("CreditQ_VRW", self.creditq_vrw),
            ("CreditNonQ_VRW", self.creditnonq_vrw),
            ("Equity_VRW", self.equity_vrw),
            ("Commodity_VRW", self.commodity_vrw),
            ("FX_VRW", self.fx_vrw),
        ];
        for (name, value) in scalars {
            if let Some(value) = value {
                check_finite(name, value)?;
            }
        }

        if let Some(lh) = self.ir_lh {
            if lh < 0.0 {
                return Err(ConfigurationError::InvalidValue {
                    name: "IR_LH".to_string(),
                    value: lh,
                });
            }
        }

        let tables = [
            ("Equity_Weights", &self.equity_weights),
            ("Commodity_Weights", &self.commodity_weights),
        ];
        for (name, table) in tables {
            for (bucket, weight) in table.iter().flatten() {
                check_finite(&format!("{}[{}]", name, bucket), *weight)?;
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Builder-style setters
    // ------------------------------------------------------------------

    /// Sets the two IR tenor axes.
    pub fn with_ir_axes<S: Into<String>>(
        mut self,
        maturities: impl IntoIterator<Item = S>,
        residual_maturities: impl IntoIterator<Item = S>,
    ) -> Self {
        self.ir_vega_maturity = Some(maturities.into_iter().map(Into::into).collect());
        self.ir_vega_residual_maturity =
            Some(residual_maturities.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the IR correlation decay and risk weight constants.
    pub fn with_ir_constants(mut self, alpha: f64, liquidity_horizon: f64, vrw: f64) -> Self {
        self.ir_alpha = Some(alpha);
        self.ir_lh = Some(liquidity_horizon);
        self.ir_vrw = Some(vrw);
        self
    }

    /// Sets the tenor axis of a credit class. Ignored for other classes.
    pub fn with_credit_tenors<S: Into<String>>(
        mut self,
        risk_class: RiskClass,
        tenors: impl IntoIterator<Item = S>,
    ) -> Self {
        let tenors = Some(tenors.into_iter().map(Into::into).collect());
        match risk_class {
            RiskClass::CreditQ => self.creditq_tenor = tenors,
            RiskClass::CreditNonQ => self.creditnonq_tenor = tenors,
            _ => {}
        }
        self
    }

    /// Sets the bucket weight table of Equity or Commodity. Ignored for other classes.
    pub fn with_bucket_weights<S: Into<String>>(
        mut self,
        risk_class: RiskClass,
        weights: impl IntoIterator<Item = (S, f64)>,
    ) -> Self {
        let table = Some(weights.into_iter().map(|(b, w)| (b.into(), w)).collect());
        match risk_class {
            RiskClass::Equity => self.equity_weights = table,
            RiskClass::Commodity => self.commodity_weights = table,
            _ => {}
        }
        self
    }

    /// Sets the scalar FX weight.
    pub fn with_fx_weight(mut self, weight: f64) -> Self {
        self.fx_weights = Some(weight);
        self
    }

    /// Sets the vega risk weight of a risk class.
    pub fn with_vega_risk_weight(mut self, risk_class: RiskClass, vrw: f64) -> Self {
        let slot = match risk_class {
            RiskClass::IR => &mut self.ir_vrw,
            RiskClass::FX => &mut self.fx_vrw,
            RiskClass::CreditQ => &mut self.creditq_vrw,
            RiskClass::CreditNonQ => &mut self.creditnonq_vrw,
            RiskClass::Equity => &mut self.equity_vrw,
            RiskClass::Commodity => &mut self.commodity_vrw,
        };
        *slot = Some(vrw);
        self
    }

    // ------------------------------------------------------------------
    // Required lookups
    // ------------------------------------------------------------------

    /// IR option maturity axis.
    pub fn ir_maturities(&self) -> Result<&[String], ConfigurationError> {
        require(self.ir_vega_maturity.as_deref(), "IR_Vega_Maturity")
    }

    /// IR residual maturity axis.
    pub fn ir_residual_maturities(&self) -> Result<&[String], ConfigurationError> {
        require(
            self.ir_vega_residual_maturity.as_deref(),
            "IR_Vega_Residual_Maturity",
        )
    }

    /// Tenor axis of a credit class.
    pub fn credit_tenors(&self, risk_class: RiskClass) -> Result<&[String], ConfigurationError> {
        match risk_class {
            RiskClass::CreditQ => require(self.creditq_tenor.as_deref(), "CreditQ_Tenor"),
            RiskClass::CreditNonQ => require(self.creditnonq_tenor.as_deref(), "CreditNonQ_Tenor"),
            _ => Err(ConfigurationError::MissingParameter("Credit_Tenor")),
        }
    }

    /// Bucket weight table of Equity or Commodity.
    pub fn bucket_weights(
        &self,
        risk_class: RiskClass,
    ) -> Result<&BTreeMap<String, f64>, ConfigurationError> {
        match risk_class {
            RiskClass::Equity => require(self.equity_weights.as_ref(), "Equity_Weights"),
            RiskClass::Commodity => require(self.commodity_weights.as_ref(), "Commodity_Weights"),
            _ => Err(ConfigurationError::MissingParameter("Bucket_Weights")),
        }
    }

    /// Scalar FX weight.
    pub fn fx_weight(&self) -> Result<f64, ConfigurationError> {
        require(self.fx_weights, "FX_Weights")
    }

    /// IR correlation decay.
    pub fn alpha(&self) -> Result<f64, ConfigurationError> {
        require(self.ir_alpha, "IR_Alpha")
    }

    /// IR liquidity horizon.
    pub fn liquidity_horizon(&self) -> Result<f64, ConfigurationError> {
        require(self.ir_lh, "IR_LH")
    }

    /// Vega risk weight of a risk class.
    pub fn vega_risk_weight(&self, risk_class: RiskClass) -> Result<f64, ConfigurationError> {
        match risk_class {
            RiskClass::IR => require(self.ir_vrw, "IR_VRW"),
            RiskClass::FX => require(self.fx_vrw, "FX_VRW"),
            RiskClass::CreditQ => require(self.creditq_vrw, "CreditQ_VRW"),
            RiskClass::CreditNonQ => require(self.creditnonq_vrw, "CreditNonQ_VRW"),
            RiskClass::Equity => require(self.equity_vrw, "Equity_VRW"),
            RiskClass::Commodity => require(self.commodity_vrw, "Commodity_VRW"),
        }
    }
}

fn require<T>(value: Option<T>, name: &'static str) -> Result<T, ConfigurationError> {
    value.ok_or(ConfigurationError::MissingParameter(name))
}

fn check_finite(name: &str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidValue {
            name: name.to_string(),
            value,
        })
    }
}
