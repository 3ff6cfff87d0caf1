//! quadprec — precision testing for approximations of real functions.
//!
//! An approximate function is compared against a reference by integrating
//! their pointwise distance over a domain with composite quadrature. The
//! resulting error metrics (mean, RMS, max, relative, absolute) are checked
//! against a tolerance by a fail policy and recorded in a [`Session`].
//!
//! ```rust
//! use quadprec::prelude::*;
//!
//! let mut session = Session::begin("exp", Vec::<String>::new());
//!
//! // Fourth-order Taylor polynomial of exp near zero.
//! let taylor = |x: f64| 1.0 + x + x * x / 2.0 + x * x * x / 6.0 + x * x * x * x / 24.0;
//! session
//!     .estimate(
//!         "exp_taylor",
//!         taylor,
//!         f64::exp,
//!         EstimateOptions::new(vec![Interval::new(-0.1, 0.1)])
//!             .tolerance(1e-6)
//!             .fail(fail_on_mean_error()),
//!     )
//!     .unwrap();
//!
//! session.equals_real("exp(0)", 0.0_f64.exp(), 1.0, None);
//!
//! let reciprocal = session.real_options(vec![Interval::new(1.0, 10.0)]).tolerance(1e-12);
//! session.involution("1/x", |x: f64| 1.0 / x, reciprocal).unwrap();
//!
//! let summary = session.end(&mut MemorySink::default()).unwrap();
//! assert_eq!(summary.total_tests, 3);
//! assert_eq!(summary.failed_tests, 0);
//! ```
//!
//! # Modules
//!
//! - [`interval`] — closed real ranges making up estimation domains
//! - [`distance`] — pointwise distance functions
//! - [`fail`] — fail policies deciding pass/fail from error metrics
//! - [`estimator`] — Simpson, trapezoid and Monte Carlo error estimators
//! - [`result`] — options and result records
//! - [`equals`] — direct tolerance comparison
//! - [`properties`] — identity, involution, idempotence and homogeneity checks
//! - [`session`] — test registration, concurrent dispatch and collection
//! - [`field`] — named-field access for printers
//! - [`sink`] — output collaborators receiving finished results
//! - [`random`] — seeded per-test random streams

pub mod distance;
pub mod equals;
pub mod error;
pub mod estimator;
pub mod fail;
pub mod field;
pub mod interval;
pub mod properties;
pub mod random;
pub mod result;
pub mod session;
pub mod sink;

pub use error::PrecError;
pub use estimator::{Estimator, MonteCarlo, Simpson, Trapezoid};
pub use interval::Interval;
pub use result::{EqualityOptions, EqualityResult, EstimateOptions, EstimateResult};
pub use session::{Session, SessionSettings};
pub use sink::{ResultSink, SessionReport, SessionSummary};

/// Everything needed to write a test module.
pub mod prelude {
    pub use crate::distance::{self, DistanceFn};
    pub use crate::error::PrecError;
    pub use crate::estimator::{Estimator, MonteCarlo, Simpson, Trapezoid};
    pub use crate::fail::{
        fail_on_max_error, fail_on_mean_error, fail_on_rel_error, fail_on_rms_error, FailMetric,
        FailPolicy,
    };
    pub use crate::field::ResolveField;
    pub use crate::interval::Interval;
    pub use crate::result::{EqualityOptions, EqualityResult, EstimateOptions, EstimateResult};
    pub use crate::session::{Session, SessionSettings};
    pub use crate::sink::{LogSink, MemorySink, ResultSink, SessionReport, SessionSummary};
}
