//! Test execution and orchestration.
//!
//! [`ValidationRunner`] registers every configured test case on a
//! [`Session`] and ends the session into a sink.
//!
//! ```rust
//! use quadprec_validate::{config::ValidationConfig, runner::ValidationRunner};
//!
//! let mut config = ValidationConfig::default_config();
//! config.tests.retain(|name, _| name == "square" || name == "reciprocal");
//!
//! let runner = ValidationRunner::new(config);
//! let report = runner.run(&[]).unwrap();
//! assert_eq!(report.summary.failed_tests, 0);
//! ```

use crate::catalog::{self, RealFn};
use crate::config::{QuadratureConfig, TestCase, ValidationConfig};
use quadprec::error::PrecError;
use quadprec::result::{EqualityOptions, EstimateOptions};
use quadprec::session::Session;
use quadprec::sink::{ResultSink, SessionReport, SessionSummary};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Test '{0}' is not in the configuration")]
    UnknownTest(String),
    #[error("Test '{test}' refers to unknown function '{function}'")]
    UnknownFunction { test: String, function: String },
    #[error("Test '{test}' is invalid: {source}")]
    InvalidTest {
        test: String,
        #[source]
        source: PrecError,
    },
    #[error("Failed to write results: {0}")]
    OutputError(#[from] PrecError),
}

/// Runs the test cases of a [`ValidationConfig`].
pub struct ValidationRunner {
    config: ValidationConfig,
}

impl ValidationRunner {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Start a session restricted to `picked` (every test when empty).
    pub fn session(&self, picked: &[String]) -> Result<Session, RunnerError> {
        if let Some(unknown) = picked.iter().find(|t| !self.config.tests.contains_key(*t)) {
            return Err(RunnerError::UnknownTest(unknown.clone()));
        }
        Ok(Session::with_settings(
            self.config.session.clone(),
            picked.iter().cloned(),
        ))
    }

    /// Register every configured test case on `session`.
    pub fn register(&self, session: &mut Session) -> Result<(), RunnerError> {
        for (name, test) in &self.config.tests {
            if !session.is_picked(name) {
                continue;
            }
            debug!(test = %name, check = test.kind(), "Registering test");
            self.register_one(session, name, test)?;
        }
        Ok(())
    }

    fn register_one(
        &self,
        session: &mut Session,
        name: &str,
        test: &TestCase,
    ) -> Result<(), RunnerError> {
        let invalid = |source| RunnerError::InvalidTest {
            test: name.to_string(),
            source,
        };

        match test {
            TestCase::Estimate {
                approx,
                expected,
                quadrature,
                ..
            } => {
                let approx = resolve(name, approx)?;
                let expected = resolve(name, expected)?;
                let options = estimate_options(session, quadrature);
                session
                    .estimate(name, approx, expected, options)
                    .map_err(invalid)
            }
            TestCase::Equals {
                function,
                cases,
                tolerance,
                quiet,
                ..
            } => {
                let f = resolve(name, function)?;
                let options = EqualityOptions::default()
                    .tolerance(tolerance.unwrap_or(session.settings().default_tolerance))
                    .quiet(*quiet);
                session.equals_fn(name, f, cases, &options);
                Ok(())
            }
            TestCase::Identity {
                function,
                quadrature,
                ..
            } => {
                let f = resolve(name, function)?;
                let options = estimate_options(session, quadrature);
                session.identity(name, f, options).map_err(invalid)
            }
            TestCase::Involution {
                function,
                quadrature,
                ..
            } => {
                let f = resolve(name, function)?;
                let options = estimate_options(session, quadrature);
                session.involution(name, f, options).map_err(invalid)
            }
            TestCase::Idempotence {
                function,
                quadrature,
                ..
            } => {
                let f = resolve(name, function)?;
                let options = estimate_options(session, quadrature);
                session.idempotence(name, f, options).map_err(invalid)
            }
            TestCase::Homogeneous {
                function,
                zero,
                quadrature,
                ..
            } => {
                let f = resolve(name, function)?;
                let options = estimate_options(session, quadrature);
                session
                    .homogeneous_with_zero(name, f, options, *zero)
                    .map_err(invalid)
            }
        }
    }

    /// Run the picked tests and return everything the session produced.
    pub fn run(&self, picked: &[String]) -> Result<SessionReport, RunnerError> {
        let mut session = self.session(picked)?;
        self.register(&mut session)?;
        let report = session.finish();
        info!(
            total = report.summary.total_tests,
            failed = report.summary.failed_tests,
            "Validation finished"
        );
        Ok(report)
    }

    /// Run the picked tests and hand the results to `sink`.
    pub fn run_into(
        &self,
        picked: &[String],
        sink: &mut dyn ResultSink,
    ) -> Result<SessionSummary, RunnerError> {
        let mut session = self.session(picked)?;
        self.register(&mut session)?;
        Ok(session.end(sink)?)
    }
}

fn resolve(test: &str, function: &str) -> Result<RealFn, RunnerError> {
    catalog::lookup(function).ok_or_else(|| RunnerError::UnknownFunction {
        test: test.to_string(),
        function: function.to_string(),
    })
}

/// Session defaults overridden by the test's own settings.
fn estimate_options(session: &Session, quadrature: &QuadratureConfig) -> EstimateOptions<f64, f64> {
    let mut options = session
        .real_options(quadrature.domain.clone())
        .estimator(quadrature.estimator.build())
        .quiet(quadrature.quiet);
    if let Some(tolerance) = quadrature.tolerance {
        options = options.tolerance(tolerance);
    }
    if let Some(iterations) = quadrature.iterations {
        options = options.iterations(iterations);
    }
    if let Some(fail) = quadrature.fail {
        options = options.fail(fail.policy());
    }
    options
}
