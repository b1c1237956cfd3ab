//! Rayon-based fan-out across buckets.
//!
//! Buckets are independent: each reads the shared calibration and owns its
//! vector and matrix, so they can be margined on the Rayon pool with no shared
//! accumulator. Results are concatenated in bucket order whichever mode runs.

use rayon::prelude::*;
use simm_core::types::{MarginError, SensitivityRecord};
use simm_core::CalibrationParameters;
use tracing::debug;

use crate::group::{group_netted, partition_by_risk_class};
use crate::margin::{MarginModel, MarginResult};

/// Minimum bucket count before the Rayon pool is used.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// Parallel map preserving input order.
///
/// # Arguments
///
/// * `items` - Slice of items to process
/// * `mapper` - Function to apply to each item
///
/// # Returns
///
/// Vector of mapped results.
pub fn parallel_map<T, R, F>(items: &[T], mapper: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    items.par_iter().map(mapper).collect()
}

/// Configuration for parallel execution.
#[derive(Clone, Debug)]
pub struct ParallelConfig {
    /// Minimum buckets before using parallelism
    pub parallel_threshold: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ParallelConfig {
    /// Creates a new parallel configuration.
    pub fn new(parallel_threshold: usize) -> Self {
        Self { parallel_threshold }
    }

    /// A configuration that never leaves the calling thread.
    pub fn sequential() -> Self {
        Self {
            parallel_threshold: usize::MAX,
        }
    }

    /// Returns whether to use parallel processing for the given item count.
    #[inline]
    pub fn should_parallelize(&self, n_items: usize) -> bool {
        n_items >= self.parallel_threshold
    }
}

/// Margins a homogeneous risk-class working set.
///
/// Nets the records, partitions the netted rows into buckets and margins
/// every bucket, on the Rayon pool when `config` says so. The first failing
/// bucket, in bucket order, decides the returned error.
///
/// # Examples
///
/// ```rust
/// use simm_core::{CalibrationParameters, RiskClass, SensitivityRecord};
/// use simm_vega::margin::VegaMargin;
/// use simm_vega::parallel::{margin_risk_class, ParallelConfig};
///
/// let params = CalibrationParameters::new()
///     .with_ir_axes(["5Y"], ["0"])
///     .with_ir_constants(0.01, 10.0, 0.2);
/// let record = SensitivityRecord::new("C1", "Risk_IRVol", RiskClass::IR)
///     .with_bucket("USD")
///     .with_labels(None, Some("5Y"), Some("0"))
///     .with_values(1.0, 100.0, 100.0);
///
/// let results =
///     margin_risk_class(&VegaMargin, &[record], &params, &ParallelConfig::default()).unwrap();
/// assert_eq!(results.len(), 1);
/// assert!((results[0].k - 20.0).abs() < 1e-9);
/// ```
pub fn margin_risk_class<M: MarginModel>(
    model: &M,
    records: &[SensitivityRecord],
    params: &CalibrationParameters,
    config: &ParallelConfig,
) -> Result<Vec<MarginResult>, MarginError> {
    let netted = model.net_sensitivities(records, params)?;
    let groups = group_netted(netted)?;
    let parallel = config.should_parallelize(groups.len());

    debug!(
        margin_type = model.margin_type(),
        buckets = groups.len(),
        parallel,
        "Margining risk class"
    );

    let per_group: Vec<Result<Vec<MarginResult>, MarginError>> = if parallel {
        parallel_map(&groups, |group| model.margin_risk_group(group, params))
    } else {
        groups
            .iter()
            .map(|group| model.margin_risk_group(group, params))
            .collect()
    };

    let mut results = Vec::new();
    for group_results in per_group {
        results.extend(group_results?);
    }
    Ok(results)
}

/// Margins a working set that may mix risk classes.
///
/// Records are split into homogeneous sets in first-seen class order and each
/// set goes through [`margin_risk_class`].
pub fn margin_portfolio<M: MarginModel>(
    model: &M,
    records: &[SensitivityRecord],
    params: &CalibrationParameters,
    config: &ParallelConfig,
) -> Result<Vec<MarginResult>, MarginError> {
    let mut results = Vec::new();
    for (_, class_records) in partition_by_risk_class(records) {
        results.extend(margin_risk_class(model, &class_records, params, config)?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::margin::VegaMargin;
    use simm_core::types::{ConfigurationError, RiskClass};

    fn equity(bucket: &str, qualifier: &str, amount: f64) -> SensitivityRecord {
        SensitivityRecord::new("C1", "Risk_EquityVol", RiskClass::Equity)
            .with_product_class("Equity")
            .with_qualifier(qualifier)
            .with_bucket(bucket)
            .with_values(1.0, amount, amount)
    }

    fn params() -> CalibrationParameters {
        CalibrationParameters::new()
            .with_ir_constants(0.01, 10.0, 0.2)
            .with_bucket_weights(
                RiskClass::Equity,
                (1..=12).map(|b| (b.to_string(), 0.25)),
            )
    }

    fn book() -> Vec<SensitivityRecord> {
        (1..=12)
            .flat_map(|b| {
                let bucket = b.to_string();
                vec![
                    equity(&bucket, "AAA", 1_000.0 * b as f64),
                    equity(&bucket, "BBB", -250.0 * b as f64),
                ]
            })
            .collect()
    }

    #[test]
    fn test_parallel_map() {
        let items: Vec<i32> = (0..100).collect();
        let doubled: Vec<i32> = parallel_map(&items, |&x| x * 2);

        assert_eq!(doubled.len(), 100);
        assert_eq!(doubled[50], 100);
    }

    #[test]
    fn test_parallel_config_default() {
        let config = ParallelConfig::default();
        assert_eq!(config.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
    }

    #[test]
    fn test_should_parallelize() {
        let config = ParallelConfig::new(10);
        assert!(!config.should_parallelize(5));
        assert!(config.should_parallelize(10));
        assert!(!ParallelConfig::sequential().should_parallelize(1_000_000));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let records = book();
        let parallel =
            margin_risk_class(&VegaMargin, &records, &params(), &ParallelConfig::new(1)).unwrap();
        let sequential =
            margin_risk_class(&VegaMargin, &records, &params(), &ParallelConfig::sequential())
                .unwrap();

        assert_eq!(parallel.len(), 12);
        assert_eq!(parallel, sequential);
        let groups: Vec<&str> = parallel.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups[0], "1");
        assert_eq!(groups[11], "12");
    }

    #[test]
    fn test_first_error_returned() {
        let err = margin_risk_class(
            &VegaMargin,
            &book(),
            &CalibrationParameters::new().with_bucket_weights(RiskClass::Equity, [("1", 0.25)]),
            &ParallelConfig::new(1),
        )
        .unwrap_err();
        assert_eq!(
            err,
            MarginError::Configuration(ConfigurationError::MissingParameter("IR_VRW"))
        );
    }

    #[test]
    fn test_margin_portfolio_mixed_classes() {
        let mut records = book();
        records.push(
            SensitivityRecord::new("C1", "Risk_IRVol", RiskClass::IR)
                .with_bucket("USD")
                .with_labels(None, Some("5Y"), Some("0"))
                .with_values(1.0, 100.0, 100.0),
        );
        let params = params().with_ir_axes(["5Y"], ["0"]);

        let results =
            margin_portfolio(&VegaMargin, &records, &params, &ParallelConfig::default()).unwrap();
        assert_eq!(results.len(), 13);
        assert_eq!(results[12].risk_class, RiskClass::IR);
    }
}
