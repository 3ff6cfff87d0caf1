//! Closed intervals over the real numbers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed range between `a` and `b`.
///
/// The bounds may be given in either order; [`Interval::measure`] is always
/// non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub a: f64,
    pub b: f64,
}

impl Interval {
    pub const fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    /// Length of the interval, `|b - a|`.
    pub fn measure(&self) -> f64 {
        (self.b - self.a).abs()
    }

    /// Smaller of the two bounds.
    pub fn lower(&self) -> f64 {
        self.a.min(self.b)
    }

    /// Larger of the two bounds.
    pub fn upper(&self) -> f64 {
        self.a.max(self.b)
    }
}

impl From<(f64, f64)> for Interval {
    fn from((a, b): (f64, f64)) -> Self {
        Self::new(a, b)
    }
}

impl From<[f64; 2]> for Interval {
    fn from([a, b]: [f64; 2]) -> Self {
        Self::new(a, b)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.a, self.b)
    }
}

/// Total measure of a list of intervals.
pub fn total_measure(domain: &[Interval]) -> f64 {
    domain.iter().map(Interval::measure).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_ignores_bound_order() {
        assert_eq!(Interval::new(1.0, 4.0).measure(), 3.0);
        assert_eq!(Interval::new(4.0, 1.0).measure(), 3.0);
        assert_eq!(Interval::new(2.0, 2.0).measure(), 0.0);
    }

    #[test]
    fn lower_and_upper_are_ordered() {
        let k = Interval::new(5.0, -1.0);
        assert_eq!(k.lower(), -1.0);
        assert_eq!(k.upper(), 5.0);
    }

    #[test]
    fn total_measure_sums_intervals() {
        let domain = [Interval::new(0.0, 1.0), Interval::new(10.0, 1.0)];
        assert_eq!(total_measure(&domain), 10.0);
    }
}
