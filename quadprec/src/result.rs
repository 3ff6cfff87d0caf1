//! Options and result records for estimates and equality checks.

use crate::distance::{self, DistanceFn};
use crate::estimator::{Estimator, Simpson};
use crate::fail::{self, FailPolicy};
use crate::interval::Interval;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default number of quadrature subdivisions.
pub const DEFAULT_ITERATIONS: u32 = 1000;

/// Default tolerance for estimates and equality checks.
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Options for a single error estimation.
///
/// `domain` holds either a list of disjoint 1-D intervals to aggregate over
/// (real functions of a real variable) or one interval per dimension
/// (functions of several variables).
pub struct EstimateOptions<I, O> {
    pub domain: Vec<Interval>,
    pub tolerance: f64,
    /// Quadrature subdivisions, or samples for Monte Carlo estimators.
    pub iterations: u32,
    pub fail: FailPolicy,
    pub estimator: Arc<dyn Estimator<I, O>>,
    /// Pointwise distance between approximate and expected outputs.
    pub distance: DistanceFn<O>,
    /// Seed for estimators that sample randomly.
    pub seed: u64,
    pub quiet: bool,
}

impl<I, O> Clone for EstimateOptions<I, O> {
    fn clone(&self) -> Self {
        Self {
            domain: self.domain.clone(),
            tolerance: self.tolerance,
            iterations: self.iterations,
            fail: Arc::clone(&self.fail),
            estimator: Arc::clone(&self.estimator),
            distance: Arc::clone(&self.distance),
            seed: self.seed,
            quiet: self.quiet,
        }
    }
}

impl<I, O> fmt::Debug for EstimateOptions<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EstimateOptions")
            .field("domain", &self.domain)
            .field("tolerance", &self.tolerance)
            .field("iterations", &self.iterations)
            .field("estimator", &self.estimator.name())
            .field("seed", &self.seed)
            .field("quiet", &self.quiet)
            .finish()
    }
}

impl EstimateOptions<f64, f64> {
    /// Options for a real function of a real variable, using Simpson
    /// quadrature, absolute distance and the max-error fail policy.
    pub fn new(domain: impl Into<Vec<Interval>>) -> Self {
        Self::with_estimator(domain, Arc::new(Simpson), distance::abs())
    }
}

impl<I, O> EstimateOptions<I, O> {
    /// Options with an explicit estimator and distance function.
    pub fn with_estimator(
        domain: impl Into<Vec<Interval>>,
        estimator: Arc<dyn Estimator<I, O>>,
        distance: DistanceFn<O>,
    ) -> Self {
        Self {
            domain: domain.into(),
            tolerance: DEFAULT_TOLERANCE,
            iterations: DEFAULT_ITERATIONS,
            fail: fail::fail_on_max_error(),
            estimator,
            distance,
            seed: 0,
            quiet: false,
        }
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn fail(mut self, fail: FailPolicy) -> Self {
        self.fail = fail;
        self
    }

    pub fn estimator(mut self, estimator: Arc<dyn Estimator<I, O>>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn distance(mut self, distance: DistanceFn<O>) -> Self {
        self.distance = distance;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// Outcome of a single error estimation.
///
/// Metrics start out as NaN so that an estimator which does not fill one
/// leaves it visibly unset (and failing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub name: String,
    pub domain: Vec<Interval>,
    pub tolerance: f64,
    pub iterations: u32,
    /// Name of the estimator that produced the metrics.
    pub estimator: String,
    #[serde(with = "nan_as_null")]
    pub max_error: f64,
    #[serde(with = "nan_as_null")]
    pub mean_error: f64,
    #[serde(with = "nan_as_null")]
    pub rms_error: f64,
    #[serde(with = "nan_as_null")]
    pub rel_error: f64,
    #[serde(with = "nan_as_null")]
    pub abs_error: f64,
    /// The expected function integrates to zero, so `rel_error` is NaN
    /// without anything having gone wrong.
    #[serde(default)]
    pub zero_expected: bool,
    pub failed: bool,
    pub quiet: bool,
    /// Set when the functions could not be evaluated.
    pub error: Option<String>,
}

impl Default for EstimateResult {
    fn default() -> Self {
        Self {
            name: String::new(),
            domain: Vec::new(),
            tolerance: 0.0,
            iterations: 0,
            estimator: String::new(),
            max_error: f64::NAN,
            mean_error: f64::NAN,
            rms_error: f64::NAN,
            rel_error: f64::NAN,
            abs_error: f64::NAN,
            zero_expected: false,
            failed: false,
            quiet: false,
            error: None,
        }
    }
}

impl EstimateResult {
    /// Stamp the administrative fields taken from the options.
    pub(crate) fn stamp<I, O>(&mut self, name: &str, options: &EstimateOptions<I, O>) {
        self.name = name.to_string();
        self.domain = options.domain.clone();
        self.tolerance = options.tolerance;
        self.iterations = options.iterations;
        self.quiet = options.quiet;
        if self.estimator.is_empty() {
            self.estimator = options.estimator.name().to_string();
        }
    }

    /// Whether any metric is NaN. A NaN `rel_error` only counts when the
    /// expected integral is nonzero.
    pub fn has_nan_metric(&self) -> bool {
        self.max_error.is_nan()
            || self.mean_error.is_nan()
            || self.rms_error.is_nan()
            || self.abs_error.is_nan()
            || (self.rel_error.is_nan() && !self.zero_expected)
    }

    /// A failed result for a test case whose functions could not be evaluated.
    pub(crate) fn evaluation_failure<I, O>(
        name: &str,
        options: &EstimateOptions<I, O>,
        error: String,
    ) -> Self {
        let mut res = Self::default();
        res.stamp(name, options);
        res.failed = true;
        res.error = Some(error);
        res
    }
}

/// Options for an equality check.
pub struct EqualityOptions<T> {
    pub distance: DistanceFn<T>,
    pub tolerance: f64,
    pub quiet: bool,
}

impl<T> Clone for EqualityOptions<T> {
    fn clone(&self) -> Self {
        Self {
            distance: Arc::clone(&self.distance),
            tolerance: self.tolerance,
            quiet: self.quiet,
        }
    }
}

impl<T> fmt::Debug for EqualityOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EqualityOptions")
            .field("tolerance", &self.tolerance)
            .field("quiet", &self.quiet)
            .finish_non_exhaustive()
    }
}

impl Default for EqualityOptions<f64> {
    fn default() -> Self {
        Self::with_distance(distance::abs())
    }
}

impl<T> EqualityOptions<T> {
    pub fn with_distance(distance: DistanceFn<T>) -> Self {
        Self {
            distance,
            tolerance: DEFAULT_TOLERANCE,
            quiet: false,
        }
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// Outcome of a single equality check.
///
/// The compared values are kept in their display form so that any
/// displayable type can be recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualityResult {
    pub name: String,
    pub evaluated: String,
    pub expected: String,
    #[serde(with = "nan_as_null")]
    pub difference: f64,
    pub tolerance: f64,
    pub failed: bool,
    pub quiet: bool,
    pub error: Option<String>,
}

impl Default for EqualityResult {
    fn default() -> Self {
        Self {
            name: String::new(),
            evaluated: String::new(),
            expected: String::new(),
            difference: f64::NAN,
            tolerance: 0.0,
            failed: true,
            quiet: false,
            error: None,
        }
    }
}

/// JSON has no NaN: write it as `null` and read `null` back as NaN.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            s.serialize_none()
        } else {
            s.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
    }
}
