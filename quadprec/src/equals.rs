//! Direct tolerance comparison of two values.

use crate::result::{EqualityOptions, EqualityResult};
use std::fmt::Display;

/// Compare `evaluated` against `expected` with the options' distance.
///
/// A NaN difference fails the check.
pub fn check_equality<T: Display>(
    name: &str,
    evaluated: &T,
    expected: &T,
    options: &EqualityOptions<T>,
) -> EqualityResult {
    let difference = (options.distance)(evaluated, expected);
    EqualityResult {
        name: name.to_string(),
        evaluated: evaluated.to_string(),
        expected: expected.to_string(),
        difference,
        tolerance: options.tolerance,
        failed: difference > options.tolerance || difference.is_nan(),
        quiet: options.quiet,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance;

    #[test]
    fn within_tolerance_passes() {
        let opt = EqualityOptions::default().tolerance(1e-3);
        let r = check_equality("near", &1.0, &1.0005, &opt);
        assert!(!r.failed);
        assert!((r.difference - 0.0005).abs() < 1e-12);
        assert_eq!(r.evaluated, "1");
        assert_eq!(r.expected, "1.0005");
    }

    #[test]
    fn beyond_tolerance_fails() {
        let opt = EqualityOptions::default().tolerance(1e-3);
        assert!(check_equality("far", &1.0, &1.1, &opt).failed);
    }

    #[test]
    fn nan_difference_fails() {
        let opt = EqualityOptions::default().tolerance(f64::INFINITY);
        assert!(check_equality("nan", &f64::NAN, &1.0, &opt).failed);
    }

    #[test]
    fn custom_distance_on_strings() {
        let opt = EqualityOptions::with_distance(distance::hamming()).tolerance(1.0);
        let r = check_equality("typo", &"kitten".to_string(), &"kitted".to_string(), &opt);
        assert_eq!(r.difference, 1.0);
        assert!(!r.failed);
    }
}
