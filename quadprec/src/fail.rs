//! Fail policies: predicates deciding whether an estimate failed.
//!
//! Every standard policy treats a NaN target metric as a failure, so an
//! estimate that could not compute its metric never passes silently.

use crate::result::EstimateResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A shareable predicate mapping an estimate to pass (`false`) or fail (`true`).
pub type FailPolicy = Arc<dyn Fn(&EstimateResult) -> bool + Send + Sync>;

fn exceeds(metric: f64, tolerance: f64) -> bool {
    metric > tolerance || metric.is_nan()
}

/// Fail if the maximum error exceeds the tolerance or is NaN.
pub fn fail_on_max_error() -> FailPolicy {
    Arc::new(|r: &EstimateResult| exceeds(r.max_error, r.tolerance))
}

/// Fail if the mean error exceeds the tolerance or is NaN.
pub fn fail_on_mean_error() -> FailPolicy {
    Arc::new(|r: &EstimateResult| exceeds(r.mean_error, r.tolerance))
}

/// Fail if the RMS error exceeds the tolerance or is NaN.
pub fn fail_on_rms_error() -> FailPolicy {
    Arc::new(|r: &EstimateResult| exceeds(r.rms_error, r.tolerance))
}

/// Fail if the relative error exceeds the tolerance or is NaN.
pub fn fail_on_rel_error() -> FailPolicy {
    Arc::new(|r: &EstimateResult| exceeds(r.rel_error, r.tolerance))
}

/// The metric a standard fail policy checks, for use in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailMetric {
    #[default]
    Max,
    Mean,
    Rms,
    Rel,
}

impl FailMetric {
    /// The standard policy for this metric.
    pub fn policy(self) -> FailPolicy {
        match self {
            FailMetric::Max => fail_on_max_error(),
            FailMetric::Mean => fail_on_mean_error(),
            FailMetric::Rms => fail_on_rms_error(),
            FailMetric::Rel => fail_on_rel_error(),
        }
    }

    /// The value of this metric in a result.
    pub fn value(self, r: &EstimateResult) -> f64 {
        match self {
            FailMetric::Max => r.max_error,
            FailMetric::Mean => r.mean_error,
            FailMetric::Rms => r.rms_error,
            FailMetric::Rel => r.rel_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [FailMetric; 4] = [FailMetric::Max, FailMetric::Mean, FailMetric::Rms, FailMetric::Rel];

    fn result_with(value: f64, tolerance: f64) -> EstimateResult {
        EstimateResult {
            max_error: value,
            mean_error: value,
            rms_error: value,
            rel_error: value,
            abs_error: value,
            tolerance,
            ..EstimateResult::default()
        }
    }

    #[test]
    fn nan_target_metric_always_fails() {
        for metric in ALL {
            let policy = metric.policy();
            let mut r = result_with(0.0, 1.0);
            match metric {
                FailMetric::Max => r.max_error = f64::NAN,
                FailMetric::Mean => r.mean_error = f64::NAN,
                FailMetric::Rms => r.rms_error = f64::NAN,
                FailMetric::Rel => r.rel_error = f64::NAN,
            }
            assert!(policy(&r), "{metric:?} policy passed a NaN metric");
        }
    }

    #[test]
    fn metric_within_tolerance_passes() {
        for metric in ALL {
            assert!(!metric.policy()(&result_with(1e-10, 1e-8)));
            assert!(!metric.policy()(&result_with(1e-8, 1e-8)), "equal to tolerance passes");
            assert!(metric.policy()(&result_with(1e-6, 1e-8)));
        }
    }

    #[test]
    fn policies_only_look_at_their_metric() {
        let r = EstimateResult {
            max_error: 10.0,
            mean_error: 0.0,
            rms_error: 0.0,
            rel_error: 0.0,
            tolerance: 1.0,
            ..EstimateResult::default()
        };
        assert!(fail_on_max_error()(&r));
        assert!(!fail_on_mean_error()(&r));
        assert!(!fail_on_rms_error()(&r));
        assert!(!fail_on_rel_error()(&r));
    }

    #[test]
    fn fail_metric_defaults_to_max_and_reads_its_value() {
        assert_eq!(FailMetric::default(), FailMetric::Max);
        let r = result_with(0.5, 1.0);
        assert_eq!(FailMetric::Rms.value(&r), 0.5);
    }
}
