//! Vega command implementation
//!
//! Loads positions and calibration, runs the vega margin pipeline over every
//! risk class present and writes one row per bucket identity.

use std::io::Write;
use std::path::Path;

use simm_vega::margin::{MarginResult, VegaMargin};
use simm_vega::parallel::{margin_portfolio, ParallelConfig};
use tracing::info;

use super::load_calibration;
use crate::config::{CliConfig, OutputFormat};
use crate::loader::load_positions;
use crate::Result;

/// Run the vega command
pub fn run(positions: &Path, config: &CliConfig) -> Result<()> {
    info!("Starting vega margin run...");
    info!("  Positions: {}", positions.display());
    info!("  Output format: {}", config.output_format);

    let params = load_calibration(config)?;
    let records = load_positions(positions)?;
    let parallel = ParallelConfig::new(config.parallel_threshold);

    let results = margin_portfolio(&VegaMargin, &records, &params, &parallel)?;
    info!("  Buckets margined: {}", results.len());

    let stdout = std::io::stdout();
    write_results(&results, config.output_format, stdout.lock())?;

    info!("Vega margin run complete");
    Ok(())
}

/// Writes margin results in the requested format.
pub fn write_results<W: Write>(
    results: &[MarginResult],
    format: OutputFormat,
    mut out: W,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, results)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for result in results {
                writer.serialize(result)?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => write_table(results, &mut out)?,
    }
    Ok(())
}

const COLUMNS: [(&str, usize); 7] = [
    ("CombinationID", 14),
    ("RiskType", 18),
    ("RiskClass", 10),
    ("Group", 12),
    ("K", 16),
    ("S", 16),
    ("S_lat", 16),
];

fn rule<W: Write>(out: &mut W, left: &str, mid: &str, right: &str) -> std::io::Result<()> {
    let segments: Vec<String> = COLUMNS.iter().map(|(_, w)| "─".repeat(w + 2)).collect();
    writeln!(out, "{}{}{}", left, segments.join(mid), right)
}

fn write_table<W: Write>(results: &[MarginResult], out: &mut W) -> std::io::Result<()> {
    rule(out, "┌", "┬", "┐")?;
    let header: Vec<String> = COLUMNS
        .iter()
        .map(|(name, w)| format!(" {:<width$} ", name, width = *w))
        .collect();
    writeln!(out, "│{}│", header.join("│"))?;
    rule(out, "├", "┼", "┤")?;

    if results.is_empty() {
        let cells: Vec<String> = COLUMNS
            .iter()
            .enumerate()
            .map(|(i, (_, w))| {
                let cell = if i == 0 { "(no data)" } else { "" };
                format!(" {:<width$} ", cell, width = *w)
            })
            .collect();
        writeln!(out, "│{}│", cells.join("│"))?;
    }
    for r in results {
        writeln!(
            out,
            "│ {:<w0$} │ {:<w1$} │ {:<w2$} │ {:<w3$} │ {:>w4$.2} │ {:>w5$.2} │ {:>w6$.2} │",
            r.combination_id,
            r.risk_type,
            r.risk_class.name(),
            r.group,
            r.k,
            r.s,
            r.s_lat,
            w0 = COLUMNS[0].1,
            w1 = COLUMNS[1].1,
            w2 = COLUMNS[2].1,
            w3 = COLUMNS[3].1,
            w4 = COLUMNS[4].1,
            w5 = COLUMNS[5].1,
            w6 = COLUMNS[6].1,
        )?;
    }

    rule(out, "└", "┴", "┘")
}

#[cfg(test)]
mod tests {
    use super::*;
    use simm_core::RiskClass;

    fn result() -> MarginResult {
        MarginResult {
            combination_id: "C1".to_string(),
            risk_type: "Risk_IRVol".to_string(),
            risk_class: RiskClass::IR,
            k: 39.19,
            s: -12.5,
            s_lat: -12.5,
            group: "USD".to_string(),
        }
    }

    fn render(results: &[MarginResult], format: OutputFormat) -> String {
        let mut buffer = Vec::new();
        write_results(results, format, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_csv_output() {
        let text = render(&[result()], OutputFormat::Csv);
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("CombinationID,RiskType,RiskClass,K,S,S_lat,Group")
        );
        assert_eq!(lines.next(), Some("C1,Risk_IRVol,IR,39.19,-12.5,-12.5,USD"));
    }

    #[test]
    fn test_json_output() {
        let text = render(&[result()], OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["Group"], "USD");
        assert_eq!(value[0]["K"], 39.19);
    }

    #[test]
    fn test_table_output() {
        let text = render(&[result()], OutputFormat::Table);
        assert!(text.starts_with('┌'));
        assert!(text.contains("Risk_IRVol"));
        assert!(text.contains("39.19"));
        assert!(text.contains("-12.50"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_sample_data_run() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
        let config = CliConfig {
            calibration: Some(data.join("calibration.toml")),
            ..Default::default()
        };
        let params = load_calibration(&config).unwrap();
        let records = load_positions(&data.join("positions.csv")).unwrap();

        let results =
            margin_portfolio(&VegaMargin, &records, &params, &ParallelConfig::default()).unwrap();
        let groups: Vec<(RiskClass, &str)> = results
            .iter()
            .map(|r| (r.risk_class, r.group.as_str()))
            .collect();
        assert_eq!(
            groups,
            vec![
                (RiskClass::IR, "USD"),
                (RiskClass::IR, "EUR"),
                (RiskClass::FX, "Risk_FXVol"),
                (RiskClass::CreditQ, "3"),
                (RiskClass::Equity, "1"),
                (RiskClass::Commodity, "2"),
            ]
        );
        for r in &results {
            assert!(r.k > 0.0);
            assert!(r.s_lat.abs() <= r.k);
        }
    }

    #[test]
    fn test_table_empty() {
        let text = render(&[], OutputFormat::Table);
        assert!(text.contains("(no data)"));
    }
}
