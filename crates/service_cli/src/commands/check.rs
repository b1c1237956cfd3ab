//! Check command implementation
//!
//! Loads and validates a calibration file, then prints the resolved tenor
//! axes and the vega risk weight the margin run would apply.

use simm_core::{convert_tenor_to_years, CalibrationParameters, RiskClass};
use simm_vega::group::RiskGroup;
use simm_vega::weights::build_risk_weights;
use tracing::info;

use super::load_calibration;
use crate::config::CliConfig;
use crate::Result;

/// Run the check command
pub fn run(config: &CliConfig) -> Result<()> {
    info!("Checking calibration...");
    let params = load_calibration(config)?;

    for line in summary(&params)? {
        println!("{}", line);
    }

    info!("Calibration OK");
    Ok(())
}

/// Human-readable summary of a validated calibration.
pub fn summary(params: &CalibrationParameters) -> Result<Vec<String>> {
    let mut lines = Vec::new();

    let axis = |name: &str, labels: Option<&[String]>| -> Result<String> {
        Ok(match labels {
            Some(labels) => {
                let years = labels
                    .iter()
                    .map(|l| convert_tenor_to_years(l).map(|y| format!("{}={:.4}", l, y)))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                format!("{:<26} {}", name, years.join(" "))
            }
            None => format!("{:<26} (not set)", name),
        })
    };

    lines.push(axis("IR_Vega_Maturity", params.ir_maturities().ok())?);
    lines.push(axis(
        "IR_Vega_Residual_Maturity",
        params.ir_residual_maturities().ok(),
    )?);
    lines.push(axis("CreditQ_Tenor", params.credit_tenors(RiskClass::CreditQ).ok())?);
    lines.push(axis(
        "CreditNonQ_Tenor",
        params.credit_tenors(RiskClass::CreditNonQ).ok(),
    )?);

    for class in [RiskClass::Equity, RiskClass::Commodity] {
        let buckets = params
            .bucket_weights(class)
            .map(|table| format!("{} buckets", table.len()))
            .unwrap_or_else(|_| "(not set)".to_string());
        lines.push(format!("{:<26} {}", format!("{}_Weights", class), buckets));
    }

    let ir_group = RiskGroup::new(RiskClass::IR, "", vec![]);
    let rw = build_risk_weights(&ir_group, params)?;
    lines.push(format!("{:<26} {:.6}", "Vega risk weight", rw));

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CliError;

    #[test]
    fn test_summary() {
        let params = CalibrationParameters::new()
            .with_ir_axes(["6M", "1Y"], ["1Y"])
            .with_ir_constants(0.01, 10.0, 0.21)
            .with_bucket_weights(RiskClass::Equity, [("1", 0.25), ("2", 0.3)]);
        let lines = summary(&params).unwrap();

        assert!(lines[0].ends_with("6M=0.5000 1Y=1.0000"));
        assert!(lines[2].ends_with("(not set)"));
        assert!(lines[4].ends_with("2 buckets"));
        assert!(lines[6].ends_with("0.210000"));
    }

    #[test]
    fn test_summary_requires_ir_constants() {
        let err = summary(&CalibrationParameters::new()).unwrap_err();
        assert!(matches!(err, CliError::Calibration(_)));
    }
}
