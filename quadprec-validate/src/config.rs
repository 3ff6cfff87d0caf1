//! YAML-based validation configuration.
//!
//! This module defines the configuration schema for precision test suites.
//! Configuration can be loaded from YAML files or constructed programmatically.
//!
//! # Configuration Structure
//!
//! ```yaml
//! session:
//!   module_name: quadprec
//!   default_tolerance: 1.0e-8
//!   multithreading: true
//!
//! output:
//!   directory: output
//!   csv: true
//!
//! tests:
//!   sqrt_approx:
//!     check: estimate
//!     approx: x_sqrt_x_perturbed
//!     expected: x_sqrt_x
//!     domain:
//!       - { a: 0.0, b: 100.0 }
//!     tolerance: 0.01
//!     iterations: 1000000
//!   reciprocal:
//!     check: involution
//!     function: reciprocal
//!     domain:
//!       - { a: 1.0, b: 10.0 }
//!   square:
//!     check: equals
//!     function: square
//!     cases: [[1.0, 1.0], [2.0, 4.0], [3.0, 9.0]]
//! ```
//!
//! Function names refer to entries of the [`catalog`](crate::catalog).

use crate::catalog;
use quadprec::estimator::{Estimator, MonteCarlo, Simpson, Trapezoid};
use quadprec::fail::FailMetric;
use quadprec::interval::Interval;
use quadprec::session::SessionSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("Test '{test}' refers to unknown function '{function}'")]
    UnknownFunction { test: String, function: String },
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub output: OutputConfig,
    pub tests: BTreeMap<String, TestCase>,
}

/// Where and how results are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Write one CSV file per result kind into `directory`.
    #[serde(default)]
    pub csv: bool,
    /// Write a JSON report to this path.
    #[serde(default)]
    pub json: Option<PathBuf>,
    #[serde(default = "default_print_tables")]
    pub print_tables: bool,
}

fn default_directory() -> PathBuf { PathBuf::from("output") }
fn default_print_tables() -> bool { true }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            csv: false,
            json: None,
            print_tables: default_print_tables(),
        }
    }
}

/// Which error estimator a test case uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    #[default]
    Simpson,
    Trapezoid,
    MonteCarlo,
}

impl EstimatorKind {
    pub fn build(self) -> Arc<dyn Estimator<f64, f64>> {
        match self {
            EstimatorKind::Simpson => Arc::new(Simpson),
            EstimatorKind::Trapezoid => Arc::new(Trapezoid),
            EstimatorKind::MonteCarlo => Arc::new(MonteCarlo),
        }
    }
}

/// Quadrature settings shared by every estimate-based check.
///
/// Unset values fall back to the session defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadratureConfig {
    pub domain: Vec<Interval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<FailMetric>,
    #[serde(default)]
    pub estimator: EstimatorKind,
    #[serde(default)]
    pub quiet: bool,
}

impl QuadratureConfig {
    pub fn new(domain: Vec<Interval>) -> Self {
        Self {
            domain,
            tolerance: None,
            iterations: None,
            fail: None,
            estimator: EstimatorKind::default(),
            quiet: false,
        }
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn fail(mut self, fail: FailMetric) -> Self {
        self.fail = Some(fail);
        self
    }
}

/// A single test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum TestCase {
    /// Error of `approx` against `expected`.
    Estimate {
        #[serde(default)]
        description: String,
        approx: String,
        expected: String,
        #[serde(flatten)]
        quadrature: QuadratureConfig,
    },
    /// `function` evaluated at each input against the paired expected value.
    Equals {
        #[serde(default)]
        description: String,
        function: String,
        cases: Vec<(f64, f64)>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tolerance: Option<f64>,
        #[serde(default)]
        quiet: bool,
    },
    Identity {
        #[serde(default)]
        description: String,
        function: String,
        #[serde(flatten)]
        quadrature: QuadratureConfig,
    },
    Involution {
        #[serde(default)]
        description: String,
        function: String,
        #[serde(flatten)]
        quadrature: QuadratureConfig,
    },
    Idempotence {
        #[serde(default)]
        description: String,
        function: String,
        #[serde(flatten)]
        quadrature: QuadratureConfig,
    },
    /// `function` should equal `zero` everywhere on the domain.
    Homogeneous {
        #[serde(default)]
        description: String,
        function: String,
        #[serde(default)]
        zero: f64,
        #[serde(flatten)]
        quadrature: QuadratureConfig,
    },
}

impl TestCase {
    /// The `check` tag of this case.
    pub fn kind(&self) -> &'static str {
        match self {
            TestCase::Estimate { .. } => "estimate",
            TestCase::Equals { .. } => "equals",
            TestCase::Identity { .. } => "identity",
            TestCase::Involution { .. } => "involution",
            TestCase::Idempotence { .. } => "idempotence",
            TestCase::Homogeneous { .. } => "homogeneous",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            TestCase::Estimate { description, .. }
            | TestCase::Equals { description, .. }
            | TestCase::Identity { description, .. }
            | TestCase::Involution { description, .. }
            | TestCase::Idempotence { description, .. }
            | TestCase::Homogeneous { description, .. } => description,
        }
    }

    /// Catalog functions this case refers to.
    pub fn functions(&self) -> Vec<&str> {
        match self {
            TestCase::Estimate { approx, expected, .. } => vec![approx.as_str(), expected.as_str()],
            TestCase::Equals { function, .. }
            | TestCase::Identity { function, .. }
            | TestCase::Involution { function, .. }
            | TestCase::Idempotence { function, .. }
            | TestCase::Homogeneous { function, .. } => vec![function.as_str()],
        }
    }

    pub fn quadrature(&self) -> Option<&QuadratureConfig> {
        match self {
            TestCase::Equals { .. } => None,
            TestCase::Estimate { quadrature, .. }
            | TestCase::Identity { quadrature, .. }
            | TestCase::Involution { quadrature, .. }
            | TestCase::Idempotence { quadrature, .. }
            | TestCase::Homogeneous { quadrature, .. } => Some(quadrature),
        }
    }
}

impl ValidationConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and check a YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check_functions()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Every function name must exist in the catalog.
    pub fn check_functions(&self) -> Result<(), ConfigError> {
        for (name, test) in &self.tests {
            if let Some(missing) = test
                .functions()
                .into_iter()
                .find(|f| catalog::lookup(f).is_none())
            {
                return Err(ConfigError::UnknownFunction {
                    test: name.clone(),
                    function: missing.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Built-in suite exercising the main checks on catalog functions.
    pub fn default_config() -> Self {
        let mut tests = BTreeMap::new();

        tests.insert(
            "sqrt_approx".to_string(),
            TestCase::Estimate {
                description: "x*sqrt(x) with a perturbed radicand".to_string(),
                approx: "x_sqrt_x_perturbed".to_string(),
                expected: "x_sqrt_x".to_string(),
                quadrature: QuadratureConfig::new(vec![Interval::new(0.0, 100.0)])
                    .tolerance(1e-2)
                    .iterations(1_000_000),
            },
        );
        tests.insert(
            "exp_taylor".to_string(),
            TestCase::Estimate {
                description: "Taylor polynomial of exp near zero".to_string(),
                approx: "exp_taylor".to_string(),
                expected: "exp".to_string(),
                quadrature: QuadratureConfig::new(vec![Interval::new(-0.1, 0.1)])
                    .tolerance(1e-6)
                    .fail(FailMetric::Mean),
            },
        );
        tests.insert(
            "sin_taylor".to_string(),
            TestCase::Estimate {
                description: "Taylor polynomial of sin on two half intervals".to_string(),
                approx: "sin_taylor".to_string(),
                expected: "sin".to_string(),
                quadrature: QuadratureConfig::new(vec![
                    Interval::new(-0.5, 0.0),
                    Interval::new(0.0, 0.5),
                ])
                .tolerance(1e-4)
                .fail(FailMetric::Rms),
            },
        );
        tests.insert(
            "reciprocal".to_string(),
            TestCase::Involution {
                description: "1/x is its own inverse".to_string(),
                function: "reciprocal".to_string(),
                quadrature: QuadratureConfig::new(vec![Interval::new(1.0, 10.0)]).tolerance(1e-12),
            },
        );
        tests.insert(
            "negate".to_string(),
            TestCase::Involution {
                description: "-x is its own inverse".to_string(),
                function: "negate".to_string(),
                quadrature: QuadratureConfig::new(vec![Interval::new(-10.0, 10.0)]),
            },
        );
        tests.insert(
            "abs".to_string(),
            TestCase::Idempotence {
                description: "|x| is idempotent".to_string(),
                function: "abs".to_string(),
                quadrature: QuadratureConfig::new(vec![Interval::new(-5.0, 5.0)]),
            },
        );
        tests.insert(
            "floor".to_string(),
            TestCase::Idempotence {
                description: "floor is idempotent".to_string(),
                function: "floor".to_string(),
                quadrature: QuadratureConfig::new(vec![Interval::new(-5.0, 5.0)]),
            },
        );
        tests.insert(
            "identity".to_string(),
            TestCase::Identity {
                description: "identity function".to_string(),
                function: "identity".to_string(),
                quadrature: QuadratureConfig::new(vec![Interval::new(0.0, 1.0)]),
            },
        );
        tests.insert(
            "pythagorean".to_string(),
            TestCase::Homogeneous {
                description: "sin^2 + cos^2 - 1 vanishes".to_string(),
                function: "pythagorean_residual".to_string(),
                zero: 0.0,
                quadrature: QuadratureConfig::new(vec![Interval::new(-10.0, 10.0)])
                    .tolerance(1e-12),
            },
        );
        tests.insert(
            "square".to_string(),
            TestCase::Equals {
                description: "x^2 at small integers".to_string(),
                function: "square".to_string(),
                cases: vec![(1.0, 1.0), (2.0, 4.0), (3.0, 9.0)],
                tolerance: None,
                quiet: false,
            },
        );

        Self {
            session: SessionSettings::new("quadprec"),
            output: OutputConfig::default(),
            tests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrips_through_yaml() {
        let config = ValidationConfig::default_config();
        let yaml = config.to_yaml().unwrap();
        let parsed = ValidationConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.tests, config.tests);
        assert_eq!(parsed.session, config.session);
        assert_eq!(parsed.output, config.output);
    }

    #[test]
    fn minimal_yaml_uses_defaults() {
        let yaml = r#"
tests:
  sqrt:
    check: estimate
    approx: x_sqrt_x_perturbed
    expected: x_sqrt_x
    domain:
      - { a: 0, b: 100 }
"#;
        let config = ValidationConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.session, SessionSettings::default());
        assert_eq!(config.output, OutputConfig::default());

        let test = &config.tests["sqrt"];
        assert_eq!(test.kind(), "estimate");
        let q = test.quadrature().unwrap();
        assert_eq!(q.domain, vec![Interval::new(0.0, 100.0)]);
        assert_eq!(q.tolerance, None);
        assert_eq!(q.estimator, EstimatorKind::Simpson);
    }

    #[test]
    fn equals_cases_parse_as_pairs() {
        let yaml = r#"
tests:
  square:
    check: equals
    function: square
    cases: [[1, 1], [2, 4]]
    tolerance: 0.001
"#;
        let config = ValidationConfig::from_yaml(yaml).unwrap();
        match &config.tests["square"] {
            TestCase::Equals { cases, tolerance, .. } => {
                assert_eq!(cases, &vec![(1.0, 1.0), (2.0, 4.0)]);
                assert_eq!(*tolerance, Some(0.001));
            }
            other => panic!("expected equals, got {other:?}"),
        }
    }

    #[test]
    fn unknown_function_is_rejected() {
        let yaml = r#"
tests:
  bogus:
    check: involution
    function: not_a_function
    domain: [{ a: 0, b: 1 }]
"#;
        let err = ValidationConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownFunction { ref test, ref function }
                if test == "bogus" && function == "not_a_function"
        ));
    }

    #[test]
    fn estimator_kind_builds_named_estimators() {
        assert_eq!(EstimatorKind::Simpson.build().name(), "simpson");
        assert_eq!(EstimatorKind::Trapezoid.build().name(), "trapezoid");
        assert_eq!(EstimatorKind::MonteCarlo.build().name(), "montecarlo");
    }
}
