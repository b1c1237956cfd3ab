//! SIMM risk class identification.
//!
//! This module provides [`RiskClass`], the top-level partition of sensitivities.
//! Every working set handed to the margin core belongs to exactly one class.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::SchemaError;

/// Risk class of a sensitivity.
///
/// The class decides the netting key, the factor layout of the sensitivity
/// vector and how the bucket group label is chosen.
///
/// # Examples
///
/// ```rust
/// use simm_core::types::RiskClass;
///
/// let class: RiskClass = "Equity".parse().unwrap();
/// assert_eq!(class, RiskClass::Equity);
/// assert_eq!(format!("{}", RiskClass::CreditNonQ), "CreditNonQ");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskClass {
    /// Interest rate.
    IR,
    /// Foreign exchange.
    FX,
    /// Qualifying credit.
    CreditQ,
    /// Non-qualifying credit.
    CreditNonQ,
    /// Equity.
    Equity,
    /// Commodity.
    Commodity,
}

impl RiskClass {
    /// All risk classes in canonical order.
    pub const ALL: [RiskClass; 6] = [
        RiskClass::IR,
        RiskClass::FX,
        RiskClass::CreditQ,
        RiskClass::CreditNonQ,
        RiskClass::Equity,
        RiskClass::Commodity,
    ];

    /// Returns the canonical name used in input files.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            RiskClass::IR => "IR",
            RiskClass::FX => "FX",
            RiskClass::CreditQ => "CreditQ",
            RiskClass::CreditNonQ => "CreditNonQ",
            RiskClass::Equity => "Equity",
            RiskClass::Commodity => "Commodity",
        }
    }

    /// Returns true for the two credit classes.
    #[inline]
    pub fn is_credit(&self) -> bool {
        matches!(self, RiskClass::CreditQ | RiskClass::CreditNonQ)
    }

    /// Returns true when the margin group is labelled by bucket rather than risk type.
    ///
    /// Only FX groups are labelled by their risk type.
    #[inline]
    pub fn groups_by_bucket(&self) -> bool {
        !matches!(self, RiskClass::FX)
    }
}

impl FromStr for RiskClass {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "IR" | "ir" => Ok(RiskClass::IR),
            "FX" | "fx" => Ok(RiskClass::FX),
            "CreditQ" | "creditq" => Ok(RiskClass::CreditQ),
            "CreditNonQ" | "creditnonq" => Ok(RiskClass::CreditNonQ),
            "Equity" | "equity" => Ok(RiskClass::Equity),
            "Commodity" | "commodity" => Ok(RiskClass::Commodity),
            other => Err(SchemaError::UnknownRiskClass(other.to_string())),
        }
    }
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
