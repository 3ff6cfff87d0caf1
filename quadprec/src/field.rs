//! Named-field access to results, for table and CSV printers.
//!
//! Field names follow the column selectors used in settings files, e.g.
//! `"meanErr"`, `"failed"` or `"tolerance"`. Unknown fields resolve to an
//! empty string.

use crate::result::{EqualityResult, EstimateResult};

/// Resolve a field of a result by name into its display string.
pub trait ResolveField {
    /// `precision` is the number of digits after the point in scientific
    /// notation for error-like values.
    fn resolve_field(&self, field: &str, precision: usize) -> String;

    /// Name of the test case the result belongs to.
    fn test_name(&self) -> &str;

    fn failed(&self) -> bool;

    fn quiet(&self) -> bool;
}

fn sci(value: f64, precision: usize) -> String {
    format!("{:.*e}", precision, value)
}

impl ResolveField for EstimateResult {
    fn resolve_field(&self, field: &str, precision: usize) -> String {
        match field {
            "name" | "funcName" => self.name.clone(),
            "maxErr" => sci(self.max_error, precision),
            "meanErr" => sci(self.mean_error, precision),
            "rmsErr" => sci(self.rms_error, precision),
            "relErr" => sci(self.rel_error, precision),
            "absErr" => sci(self.abs_error, precision),
            "tolerance" => sci(self.tolerance, precision),
            "iterations" => self.iterations.to_string(),
            "estimator" => self.estimator.clone(),
            "domain" => self
                .domain
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
            "failed" => self.failed.to_string(),
            "quiet" => self.quiet.to_string(),
            "error" => self.error.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn test_name(&self) -> &str {
        &self.name
    }

    fn failed(&self) -> bool {
        self.failed
    }

    fn quiet(&self) -> bool {
        self.quiet
    }
}

impl ResolveField for EqualityResult {
    fn resolve_field(&self, field: &str, precision: usize) -> String {
        match field {
            "name" | "funcName" => self.name.clone(),
            "evaluated" => self.evaluated.clone(),
            "expected" => self.expected.clone(),
            "difference" => sci(self.difference, precision),
            "tolerance" => sci(self.tolerance, precision),
            "failed" => self.failed.to_string(),
            "quiet" => self.quiet.to_string(),
            "error" => self.error.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn test_name(&self) -> &str {
        &self.name
    }

    fn failed(&self) -> bool {
        self.failed
    }

    fn quiet(&self) -> bool {
        self.quiet
    }
}

/// Human-readable column title for a field name.
pub fn field_title(field: &str) -> &str {
    match field {
        "name" | "funcName" => "Function",
        "maxErr" => "Max Err.",
        "meanErr" => "Mean Err.",
        "rmsErr" => "RMS Err.",
        "relErr" => "Rel. Err.",
        "absErr" => "Abs. Err.",
        "tolerance" => "Tolerance",
        "iterations" => "Iterations",
        "estimator" => "Estimator",
        "domain" => "Domain",
        "evaluated" => "Evaluated",
        "expected" => "Expected",
        "difference" => "Difference",
        "failed" => "Result",
        "error" => "Error",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;

    #[test]
    fn estimate_fields_resolve_in_scientific_notation() {
        let r = EstimateResult {
            name: "sqrt".to_string(),
            domain: vec![Interval::new(0.0, 1.0)],
            mean_error: 1.26e-9,
            max_error: 3.0e-7,
            tolerance: 1e-8,
            iterations: 100,
            failed: true,
            ..EstimateResult::default()
        };
        assert_eq!(r.resolve_field("name", 1), "sqrt");
        assert_eq!(r.resolve_field("meanErr", 1), "1.3e-9");
        assert_eq!(r.resolve_field("maxErr", 2), "3.00e-7");
        assert_eq!(r.resolve_field("tolerance", 1), "1.0e-8");
        assert_eq!(r.resolve_field("iterations", 1), "100");
        assert_eq!(r.resolve_field("domain", 1), "[0, 1]");
        assert_eq!(r.resolve_field("failed", 1), "true");
        assert_eq!(r.resolve_field("rmsErr", 1), "NaN");
        assert_eq!(r.resolve_field("nonexistent", 1), "");
    }

    #[test]
    fn equality_fields_resolve() {
        let r = EqualityResult {
            name: "f(1) = 1".to_string(),
            evaluated: "1".to_string(),
            expected: "1".to_string(),
            difference: 0.0,
            tolerance: 1e-4,
            failed: false,
            ..EqualityResult::default()
        };
        assert_eq!(r.resolve_field("evaluated", 1), "1");
        assert_eq!(r.resolve_field("difference", 1), "0.0e0");
        assert_eq!(r.resolve_field("tolerance", 1), "1.0e-4");
        assert_eq!(r.resolve_field("failed", 1), "false");
        assert_eq!(r.resolve_field("maxErr", 1), "");
    }

    #[test]
    fn titles_fall_back_to_field_name() {
        assert_eq!(field_title("maxErr"), "Max Err.");
        assert_eq!(field_title("custom"), "custom");
    }
}
