//! Error estimators: numerical integration of the pointwise distance
//! between an approximation and its expected function.
//!
//! | Estimator      | Scheme                         | Domain                          |
//! |----------------|--------------------------------|---------------------------------|
//! | [`Simpson`]    | composite Simpson (reference)  | disjoint 1-D intervals          |
//! | [`Trapezoid`]  | composite trapezoid            | disjoint 1-D intervals          |
//! | [`MonteCarlo`] | crude Monte Carlo              | 1-D intervals, or a box in R^n  |
//!
//! For a single interval `[a, b]` every estimator computes
//!
//! - `abs_error  = ∫ d(x) dx` with `d(x) = distance(approx(x), expected(x))`
//! - `mean_error = abs_error / |b - a|`
//! - `rms_error  = sqrt(∫ d(x)² dx / |b - a|)`
//! - `max_error  = max d(x_i)` over every sampled node
//! - `rel_error  = abs_error / ∫ |expected(x)| dx`
//!
//! Over several intervals the integrals and measures are summed before the
//! divisions, and the maximum is taken across all intervals. Divisions by a
//! zero measure or a zero expected integral yield NaN.

use crate::error::PrecError;
use crate::interval::Interval;
use crate::random::RandomSource;
use crate::result::{EstimateOptions, EstimateResult};

/// Computes error metrics for an approximation against an expected function.
///
/// Implementations fill the five metrics of an [`EstimateResult`]; the
/// administrative fields and the `failed` flag are set by the caller.
pub trait Estimator<I, O>: Send + Sync {
    fn estimate(
        &self,
        approx: &dyn Fn(I) -> O,
        expected: &dyn Fn(I) -> O,
        options: &EstimateOptions<I, O>,
    ) -> Result<EstimateResult, PrecError>;

    /// Short name used in reports.
    fn name(&self) -> &'static str;
}

/// Reject options the quadrature cannot work with.
pub fn check_options<I, O>(options: &EstimateOptions<I, O>) -> Result<(), PrecError> {
    if options.domain.is_empty() {
        return Err(PrecError::EmptyDomain);
    }
    if options.iterations < 2 {
        return Err(PrecError::InvalidIterations {
            iterations: options.iterations,
        });
    }
    Ok(())
}

// ============================================================================
// Accumulator
// ============================================================================

/// Running integrals over one or more intervals.
#[derive(Debug, Clone, Default)]
pub struct ErrorAccumulator {
    abs_integral: f64,
    sqr_integral: f64,
    expected_integral: f64,
    measure: f64,
    max: Option<f64>,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the pointwise distance at a sampled node. NaN is sticky.
    pub fn observe(&mut self, d: f64) {
        self.max = match self.max {
            Some(m) if m.is_nan() => Some(m),
            Some(m) if !(d.is_nan() || d > m) => Some(m),
            _ => Some(d),
        };
    }

    /// Add the integrals of one interval.
    pub fn add_interval(&mut self, abs: f64, sqr: f64, expected: f64, measure: f64) {
        self.abs_integral += abs;
        self.sqr_integral += sqr;
        self.expected_integral += expected;
        self.measure += measure;
    }

    /// Write the five metrics into a fresh result.
    pub fn finish(&self) -> EstimateResult {
        let defined = self.measure > 0.0;
        EstimateResult {
            max_error: self.max.unwrap_or(f64::NAN),
            abs_error: self.abs_integral,
            mean_error: if defined { self.abs_integral / self.measure } else { f64::NAN },
            rms_error: if defined {
                (self.sqr_integral / self.measure).sqrt()
            } else {
                f64::NAN
            },
            rel_error: if defined && self.expected_integral != 0.0 {
                self.abs_integral / self.expected_integral
            } else {
                f64::NAN
            },
            zero_expected: defined && self.expected_integral == 0.0,
            ..EstimateResult::default()
        }
    }
}

/// Weighted sums for a fixed-node rule over one interval.
fn integrate_nodes(
    approx: &dyn Fn(f64) -> f64,
    expected: &dyn Fn(f64) -> f64,
    options: &EstimateOptions<f64, f64>,
    k: &Interval,
    n: u32,
    weight: impl Fn(u32) -> f64,
    acc: &mut ErrorAccumulator,
) -> (f64, f64, f64) {
    let lo = k.lower();
    let hi = k.upper();
    let dx = k.measure() / n as f64;

    let mut sum = 0.0;
    let mut sum_sqr = 0.0;
    let mut sum_expected = 0.0;

    for i in 0..=n {
        let x = if i == n { hi } else { lo + i as f64 * dx };
        let exp = expected(x);
        let d = (options.distance)(&approx(x), &exp);
        acc.observe(d);

        let w = weight(i);
        sum += w * d;
        sum_sqr += w * d * d;
        sum_expected += w * exp.abs();
    }

    (sum, sum_sqr, sum_expected)
}

/// A zero-measure interval contributes its single point to the maximum only.
fn observe_point(
    approx: &dyn Fn(f64) -> f64,
    expected: &dyn Fn(f64) -> f64,
    options: &EstimateOptions<f64, f64>,
    x: f64,
    acc: &mut ErrorAccumulator,
) {
    acc.observe((options.distance)(&approx(x), &expected(x)));
}

// ============================================================================
// Simpson
// ============================================================================

/// Composite Simpson quadrature, the reference estimator.
///
/// An odd subdivision count is rounded up to the next even number so the
/// `1, 4, 2, ..., 2, 4, 1` weight pattern ends on the right endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simpson;

impl Estimator<f64, f64> for Simpson {
    fn estimate(
        &self,
        approx: &dyn Fn(f64) -> f64,
        expected: &dyn Fn(f64) -> f64,
        options: &EstimateOptions<f64, f64>,
    ) -> Result<EstimateResult, PrecError> {
        check_options(options)?;

        let n = options
            .iterations
            .checked_add(options.iterations % 2)
            .ok_or(PrecError::InvalidIterations {
                iterations: options.iterations,
            })?;
        let mut acc = ErrorAccumulator::new();

        for k in &options.domain {
            if k.measure() == 0.0 {
                observe_point(approx, expected, options, k.a, &mut acc);
                continue;
            }

            let weight = |i: u32| {
                if i == 0 || i == n {
                    1.0
                } else if i % 2 == 1 {
                    4.0
                } else {
                    2.0
                }
            };
            let (sum, sum_sqr, sum_expected) =
                integrate_nodes(approx, expected, options, k, n, weight, &mut acc);

            let h = k.measure() / n as f64 / 3.0;
            acc.add_interval(sum * h, sum_sqr * h, sum_expected * h, k.measure());
        }

        let mut res = acc.finish();
        res.estimator = self.name().to_string();
        Ok(res)
    }

    fn name(&self) -> &'static str {
        "simpson"
    }
}

// ============================================================================
// Trapezoid
// ============================================================================

/// Composite trapezoid quadrature.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trapezoid;

impl Estimator<f64, f64> for Trapezoid {
    fn estimate(
        &self,
        approx: &dyn Fn(f64) -> f64,
        expected: &dyn Fn(f64) -> f64,
        options: &EstimateOptions<f64, f64>,
    ) -> Result<EstimateResult, PrecError> {
        check_options(options)?;

        let n = options.iterations;
        let mut acc = ErrorAccumulator::new();

        for k in &options.domain {
            if k.measure() == 0.0 {
                observe_point(approx, expected, options, k.a, &mut acc);
                continue;
            }

            let weight = |i: u32| if i == 0 || i == n { 0.5 } else { 1.0 };
            let (sum, sum_sqr, sum_expected) =
                integrate_nodes(approx, expected, options, k, n, weight, &mut acc);

            let h = k.measure() / n as f64;
            acc.add_interval(sum * h, sum_sqr * h, sum_expected * h, k.measure());
        }

        let mut res = acc.finish();
        res.estimator = self.name().to_string();
        Ok(res)
    }

    fn name(&self) -> &'static str {
        "trapezoid"
    }
}

// ============================================================================
// Monte Carlo
// ============================================================================

/// Crude Monte Carlo integration with `iterations` uniform samples.
///
/// For real functions of a real variable the samples are drawn per
/// interval and aggregated like the quadrature rules. For functions of
/// several variables the domain holds one interval per dimension and the
/// samples are drawn from the resulting box.
///
/// The maximum error is taken over the samples only, so it is a lower
/// bound of the true maximum.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonteCarlo;

impl Estimator<f64, f64> for MonteCarlo {
    fn estimate(
        &self,
        approx: &dyn Fn(f64) -> f64,
        expected: &dyn Fn(f64) -> f64,
        options: &EstimateOptions<f64, f64>,
    ) -> Result<EstimateResult, PrecError> {
        check_options(options)?;

        let n = options.iterations;
        let mut rng = RandomSource::new(options.seed);
        let mut acc = ErrorAccumulator::new();

        for k in &options.domain {
            if k.measure() == 0.0 {
                observe_point(approx, expected, options, k.a, &mut acc);
                continue;
            }

            let mut sum = 0.0;
            let mut sum_sqr = 0.0;
            let mut sum_expected = 0.0;

            for _ in 0..n {
                let x = rng.uniform(k.lower(), k.upper());
                let exp = expected(x);
                let d = (options.distance)(&approx(x), &exp);
                acc.observe(d);
                sum += d;
                sum_sqr += d * d;
                sum_expected += exp.abs();
            }

            let h = k.measure() / n as f64;
            acc.add_interval(sum * h, sum_sqr * h, sum_expected * h, k.measure());
        }

        let mut res = acc.finish();
        res.estimator = <Self as Estimator<f64, f64>>::name(self).to_string();
        Ok(res)
    }

    fn name(&self) -> &'static str {
        "montecarlo"
    }
}

impl Estimator<Vec<f64>, f64> for MonteCarlo {
    fn estimate(
        &self,
        approx: &dyn Fn(Vec<f64>) -> f64,
        expected: &dyn Fn(Vec<f64>) -> f64,
        options: &EstimateOptions<Vec<f64>, f64>,
    ) -> Result<EstimateResult, PrecError> {
        check_options(options)?;

        let n = options.iterations;
        let dims = options.domain.len();
        let volume: f64 = options.domain.iter().map(Interval::measure).product();
        let mut rng = RandomSource::new(options.seed);
        let mut acc = ErrorAccumulator::new();

        let mut sum = 0.0;
        let mut sum_sqr = 0.0;
        let mut sum_expected = 0.0;
        let mut x = vec![0.0; dims];

        for _ in 0..n {
            rng.sample_uniform(&mut x, &options.domain)?;
            let exp = expected(x.clone());
            let d = (options.distance)(&approx(x.clone()), &exp);
            acc.observe(d);
            sum += d;
            sum_sqr += d * d;
            sum_expected += exp.abs();
        }

        let h = volume / n as f64;
        acc.add_interval(sum * h, sum_sqr * h, sum_expected * h, volume);

        let mut res = acc.finish();
        res.estimator = <Self as Estimator<Vec<f64>, f64>>::name(self).to_string();
        Ok(res)
    }

    fn name(&self) -> &'static str {
        "montecarlo"
    }
}
