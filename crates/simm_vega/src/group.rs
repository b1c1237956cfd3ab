//! Risk-class bucket groups.
//!
//! A [`RiskGroup`] is the unit of margin computation: the netted rows of one
//! portfolio combination and risk class that share a bucket (or, for FX, a
//! risk type). Combinations never share a group, so each one gets its own
//! sensitivity vector and margin.

use std::collections::HashMap;

use simm_core::types::{NettedSensitivity, RiskClass, SchemaError, SensitivityRecord};

/// Netted rows of one combination's risk-class bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskGroup {
    /// Risk class shared by every row.
    pub risk_class: RiskClass,
    /// Bucket, or risk type for FX.
    pub label: String,
    /// Netted rows in first-seen order.
    pub rows: Vec<NettedSensitivity>,
}

impl RiskGroup {
    /// Creates a group.
    pub fn new(
        risk_class: RiskClass,
        label: impl Into<String>,
        rows: Vec<NettedSensitivity>,
    ) -> Self {
        Self {
            risk_class,
            label: label.into(),
            rows,
        }
    }

    /// Returns the number of netted rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the group holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// CombinationID of the group, taken from its first row.
    pub fn combination_id(&self) -> Option<&str> {
        self.rows.first().map(|row| row.combination_id.as_str())
    }

    /// Checks that every row carries the group's risk class and combination.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if let Some((row, found)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.risk_class != self.risk_class)
        {
            return Err(SchemaError::MixedRiskClass {
                expected: self.risk_class,
                found: found.risk_class,
                row,
            });
        }

        let Some(expected) = self.combination_id() else {
            return Ok(());
        };
        match self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.combination_id != expected)
        {
            Some((row, found)) => Err(SchemaError::MixedCombination {
                expected: expected.to_string(),
                found: found.combination_id.clone(),
                row,
            }),
            None => Ok(()),
        }
    }

    /// Distinct qualifiers in first-seen order.
    ///
    /// This is the explicit ordering key of positional factor layouts.
    pub fn qualifiers_in_order(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for qualifier in self.rows.iter().filter_map(|row| row.qualifier.as_deref()) {
            if !seen.contains(&qualifier) {
                seen.push(qualifier);
            }
        }
        seen
    }

    /// Distinct qualifiers in ascending order.
    pub fn qualifiers_sorted(&self) -> Vec<&str> {
        let mut qualifiers = self.qualifiers_in_order();
        qualifiers.sort_unstable();
        qualifiers
    }
}

/// Partitions netted rows into margin groups.
///
/// Rows are keyed by (risk class, CombinationID, group label) where the label
/// is the bucket, or the risk type for FX. Groups and the rows inside them
/// keep first-seen order.
///
/// # Errors
///
/// `SchemaError::MissingField` when a bucket-labelled row has no bucket.
pub fn group_netted(netted: Vec<NettedSensitivity>) -> Result<Vec<RiskGroup>, SchemaError> {
    let mut index: HashMap<(RiskClass, String, String), usize> = HashMap::new();
    let mut groups: Vec<RiskGroup> = Vec::new();

    for (row, sensitivity) in netted.into_iter().enumerate() {
        let label = sensitivity
            .group_label()
            .ok_or(SchemaError::MissingField {
                field: "Bucket",
                risk_class: sensitivity.risk_class,
                row,
            })?
            .to_string();
        let key = (
            sensitivity.risk_class,
            sensitivity.combination_id.clone(),
            label,
        );

        match index.get(&key) {
            Some(&idx) => groups[idx].rows.push(sensitivity),
            None => {
                let group = RiskGroup::new(key.0, key.2.clone(), vec![sensitivity]);
                index.insert(key, groups.len());
                groups.push(group);
            }
        }
    }

    Ok(groups)
}

/// Splits a mixed working set into homogeneous risk-class sets.
///
/// Classes appear in first-seen order; records keep their relative order.
pub fn partition_by_risk_class(
    records: &[SensitivityRecord],
) -> Vec<(RiskClass, Vec<SensitivityRecord>)> {
    let mut partitions: Vec<(RiskClass, Vec<SensitivityRecord>)> = Vec::new();
    for record in records {
        match partitions
            .iter_mut()
            .find(|(class, _)| *class == record.risk_class)
        {
            Some((_, set)) => set.push(record.clone()),
            None => partitions.push((record.risk_class, vec![record.clone()])),
        }
    }
    partitions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(risk_class: RiskClass, bucket: Option<&str>, qualifier: &str) -> NettedSensitivity {
        row_of("C1", risk_class, bucket, qualifier)
    }

    fn row_of(
        combination_id: &str,
        risk_class: RiskClass,
        bucket: Option<&str>,
        qualifier: &str,
    ) -> NettedSensitivity {
        NettedSensitivity {
            combination_id: combination_id.to_string(),
            risk_type: format!("Risk_{}Vol", risk_class),
            risk_class,
            product_class: None,
            qualifier: Some(qualifier.to_string()),
            bucket: bucket.map(str::to_string),
            label1: None,
            label2: None,
            label3: None,
            stat_value: 1.0,
            amount_usd: 1.0,
        }
    }

    #[test]
    fn test_group_by_bucket_first_seen() {
        let groups = group_netted(vec![
            row(RiskClass::Equity, Some("2"), "A"),
            row(RiskClass::Equity, Some("1"), "B"),
            row(RiskClass::Equity, Some("2"), "C"),
        ])
        .unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "2");
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].label, "1");
    }

    #[test]
    fn test_combinations_kept_apart() {
        let groups = group_netted(vec![
            row_of("C1", RiskClass::IR, Some("USD"), "USD"),
            row_of("C2", RiskClass::IR, Some("USD"), "USD"),
            row_of("C1", RiskClass::IR, Some("USD"), "USD"),
        ])
        .unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].combination_id(), Some("C1"));
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].combination_id(), Some("C2"));
        assert_eq!(groups[1].label, "USD");
        assert!(groups.iter().all(|group| group.validate().is_ok()));
    }

    #[test]
    fn test_validate_mixed_combinations() {
        let group = RiskGroup::new(
            RiskClass::IR,
            "USD",
            vec![
                row_of("C1", RiskClass::IR, Some("USD"), "USD"),
                row_of("C2", RiskClass::IR, Some("USD"), "USD"),
            ],
        );
        assert_eq!(
            group.validate(),
            Err(SchemaError::MixedCombination {
                expected: "C1".to_string(),
                found: "C2".to_string(),
                row: 1,
            })
        );
        assert_eq!(RiskGroup::new(RiskClass::IR, "USD", vec![]).combination_id(), None);
    }

    #[test]
    fn test_fx_grouped_by_risk_type() {
        let groups = group_netted(vec![
            row(RiskClass::FX, None, "EURUSD"),
            row(RiskClass::FX, None, "USDJPY"),
        ])
        .unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "Risk_FXVol");
    }

    #[test]
    fn test_missing_bucket() {
        let err = group_netted(vec![row(RiskClass::IR, None, "USD")]).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField { field: "Bucket", .. }));
    }

    #[test]
    fn test_qualifier_orders() {
        let group = RiskGroup::new(
            RiskClass::Equity,
            "1",
            vec![
                row(RiskClass::Equity, Some("1"), "ZED"),
                row(RiskClass::Equity, Some("1"), "ACME"),
                row(RiskClass::Equity, Some("1"), "ZED"),
            ],
        );
        assert_eq!(group.qualifiers_in_order(), vec!["ZED", "ACME"]);
        assert_eq!(group.qualifiers_sorted(), vec!["ACME", "ZED"]);
    }

    #[test]
    fn test_validate_mixed_rows() {
        let group = RiskGroup::new(
            RiskClass::Equity,
            "1",
            vec![
                row(RiskClass::Equity, Some("1"), "A"),
                row(RiskClass::Commodity, Some("1"), "B"),
            ],
        );
        assert!(matches!(
            group.validate(),
            Err(SchemaError::MixedRiskClass { row: 1, .. })
        ));
    }

    #[test]
    fn test_partition_by_risk_class() {
        let records = vec![
            SensitivityRecord::new("C1", "Risk_FXVol", RiskClass::FX),
            SensitivityRecord::new("C1", "Risk_IRVol", RiskClass::IR),
            SensitivityRecord::new("C2", "Risk_FXVol", RiskClass::FX),
        ];
        let parts = partition_by_risk_class(&records);

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].0, RiskClass::FX);
        assert_eq!(parts[0].1.len(), 2);
        assert_eq!(parts[0].1[1].combination_id, "C2");
        assert_eq!(parts[1].0, RiskClass::IR);
    }
}
