//! # quadprec validation library
//!
//! Configurable precision test suites on top of the `quadprec` core:
//! test cases live in a YAML file, refer to functions of a built-in
//! catalog by name, and are reported to the terminal, CSV and JSON.
//!
//! ## Library Usage
//!
//! ```rust
//! use quadprec_validate::config::ValidationConfig;
//! use quadprec_validate::runner::ValidationRunner;
//!
//! let yaml = r#"
//! session:
//!   module_name: demo
//!   multithreading: false
//! tests:
//!   exp_taylor:
//!     check: estimate
//!     approx: exp_taylor
//!     expected: exp
//!     domain: [{ a: -0.1, b: 0.1 }]
//!     tolerance: 1.0e-6
//!     fail: mean
//!   square:
//!     check: equals
//!     function: square
//!     cases: [[1, 1], [2, 4], [3, 9]]
//! "#;
//!
//! let config = ValidationConfig::from_yaml(yaml).unwrap();
//! let report = ValidationRunner::new(config).run(&[]).unwrap();
//! assert_eq!(report.summary.total_tests, 4);
//! assert_eq!(report.summary.failed_tests, 0);
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Write the default config to validate.yaml
//! quadprec-validate init
//!
//! # List configured tests and catalog functions
//! quadprec-validate list
//!
//! # Run every test, or only the named ones
//! quadprec-validate run
//! quadprec-validate run sqrt_approx reciprocal --csv --json report.json
//! ```
//!
//! The process exit code is the number of failed tests.
//!
//! ## Module Overview
//!
//! - [`catalog`] - Named real functions and their approximations
//! - [`config`] - YAML-based test configuration
//! - [`runner`] - Test orchestration on a `quadprec` session
//! - [`report`] - Terminal, CSV and JSON reporting

pub mod catalog;
pub mod config;
pub mod report;
pub mod runner;
