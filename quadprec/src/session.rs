//! Test sessions: registration, concurrent dispatch and result collection.
//!
//! A [`Session`] owns the result store for one test module. Each
//! `estimate` call runs as an independent worker (or inline when
//! multithreading is off); workers only touch the shared store to append
//! their finished result. [`Session::wait`] is the join point: counters and
//! tables are always computed from the store after every worker finished.
//!
//! ```rust
//! use quadprec::prelude::*;
//!
//! let mut session = Session::begin("sqrt", Vec::<String>::new());
//! session
//!     .estimate(
//!         "x*sqrt(x)",
//!         |x: f64| x * (x + 1e-12).sqrt(),
//!         |x: f64| x * x.sqrt(),
//!         EstimateOptions::new(vec![Interval::new(0.0, 100.0)]).tolerance(1e-2),
//!     )
//!     .unwrap();
//! let summary = session.end(&mut MemorySink::default()).unwrap();
//! assert_eq!(summary.failed_tests, 0);
//! ```

use crate::equals::check_equality;
use crate::error::PrecError;
use crate::estimator::check_options;
use crate::fail::FailMetric;
use crate::interval::Interval;
use crate::random::{clock_seed, derive_seed, name_stream};
use crate::result::{
    EqualityOptions, EqualityResult, EstimateOptions, EstimateResult, DEFAULT_ITERATIONS,
    DEFAULT_TOLERANCE,
};
use crate::sink::{
    ResultKind, ResultMap, ResultSink, ResultTable, SessionReport, SessionSummary,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt::Display;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Session-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_module_name")]
    pub module_name: String,
    #[serde(default = "default_iterations")]
    pub default_iterations: u32,
    #[serde(default = "default_tolerance")]
    pub default_tolerance: f64,
    #[serde(default)]
    pub default_fail: FailMetric,
    #[serde(default = "default_estimate_columns")]
    pub estimate_columns: Vec<String>,
    #[serde(default = "default_equation_columns")]
    pub equation_columns: Vec<String>,
    #[serde(default = "default_multithreading")]
    pub multithreading: bool,
    /// Upper bound on workers in flight; 0 means the available parallelism.
    #[serde(default)]
    pub max_workers: usize,
    /// Seed for per-test random streams; 0 means seed from the clock.
    #[serde(default)]
    pub seed: u64,
    /// Digits after the point when printing errors.
    #[serde(default = "default_output_precision")]
    pub output_precision: usize,
}

fn default_module_name() -> String { "default".to_string() }
fn default_iterations() -> u32 { DEFAULT_ITERATIONS }
fn default_tolerance() -> f64 { DEFAULT_TOLERANCE }
fn default_multithreading() -> bool { true }
fn default_output_precision() -> usize { 1 }

fn default_estimate_columns() -> Vec<String> {
    ["name", "meanErr", "rmsErr", "maxErr", "failed"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_equation_columns() -> Vec<String> {
    ["name", "difference", "tolerance", "failed"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            module_name: default_module_name(),
            default_iterations: default_iterations(),
            default_tolerance: default_tolerance(),
            default_fail: FailMetric::default(),
            estimate_columns: default_estimate_columns(),
            equation_columns: default_equation_columns(),
            multithreading: default_multithreading(),
            max_workers: 0,
            seed: 0,
            output_precision: default_output_precision(),
        }
    }
}

impl SessionSettings {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            ..Self::default()
        }
    }

    fn worker_limit(&self) -> usize {
        if self.max_workers > 0 {
            self.max_workers
        } else {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
        }
    }
}

#[derive(Debug, Default)]
struct ResultStore {
    estimates: ResultMap<EstimateResult>,
    equations: ResultMap<EqualityResult>,
}

impl ResultStore {
    fn summary(&self, module: &str) -> SessionSummary {
        let estimates = self.estimates.values().flatten();
        let equations = self.equations.values().flatten();
        let total_tests = estimates.clone().count() + equations.clone().count();
        let failed_tests =
            estimates.filter(|r| r.failed).count() + equations.filter(|r| r.failed).count();
        SessionSummary {
            module: module.to_string(),
            total_tests,
            failed_tests,
        }
    }
}

type SharedStore = Arc<Mutex<ResultStore>>;

fn lock(store: &SharedStore) -> MutexGuard<'_, ResultStore> {
    // Appends are single pushes, so a poisoned store is still consistent.
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A batch of test registrations for one module.
///
/// Results sharing a name are stored in completion order, which only
/// matches registration order when multithreading is off.
pub struct Session {
    settings: SessionSettings,
    picked: HashSet<String>,
    store: SharedStore,
    workers: VecDeque<JoinHandle<()>>,
    seed: u64,
    calls: u64,
}

impl Session {
    /// Start a session with default settings. `args` are the names of the
    /// tests to run; when empty, every test runs.
    pub fn begin<A, S>(module_name: impl Into<String>, args: A) -> Self
    where
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_settings(SessionSettings::new(module_name), args)
    }

    pub fn with_settings<A, S>(settings: SessionSettings, args: A) -> Self
    where
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let picked: HashSet<String> = args.into_iter().map(Into::into).collect();
        let seed = if settings.seed == 0 {
            clock_seed()
        } else {
            settings.seed
        };

        info!(
            module = %settings.module_name,
            picked = picked.len(),
            multithreading = settings.multithreading,
            "Starting precision testing"
        );

        Self {
            settings,
            picked,
            store: Arc::new(Mutex::new(ResultStore::default())),
            workers: VecDeque::new(),
            seed,
            calls: 0,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// The effective seed, after clock seeding.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether a test with this name runs in this session.
    pub fn is_picked(&self, name: &str) -> bool {
        self.picked.is_empty() || self.picked.contains(name)
    }

    /// Options for a real function over `domain` with the session defaults.
    pub fn real_options(&self, domain: impl Into<Vec<Interval>>) -> EstimateOptions<f64, f64> {
        EstimateOptions::new(domain)
            .tolerance(self.settings.default_tolerance)
            .iterations(self.settings.default_iterations)
            .fail(self.settings.default_fail.policy())
    }

    /// Estimate the error of `approx` against `expected`.
    ///
    /// Invalid options are rejected here. Failures while evaluating the
    /// functions are recorded as a failed result instead.
    pub fn estimate<I, O, F, G>(
        &mut self,
        name: &str,
        approx: F,
        expected: G,
        mut options: EstimateOptions<I, O>,
    ) -> Result<(), PrecError>
    where
        I: 'static,
        O: 'static,
        F: Fn(I) -> O + Send + Sync + 'static,
        G: Fn(I) -> O + Send + Sync + 'static,
    {
        if !self.is_picked(name) {
            return Ok(());
        }
        check_options(&options)?;

        if options.seed == 0 {
            options.seed = derive_seed(self.seed, name_stream(name) ^ self.calls);
        }
        self.calls += 1;

        debug!(
            test = name,
            estimator = options.estimator.name(),
            iterations = options.iterations,
            "Dispatching estimate"
        );

        let store = Arc::clone(&self.store);
        let name = name.to_string();
        let task = move || {
            let res = run_estimate(&name, &approx, &expected, &options);
            lock(&store).estimates.entry(name).or_default().push(res);
        };

        self.dispatch(task);
        Ok(())
    }

    /// Estimate a real function over one interval with the session defaults.
    pub fn estimate_on<F, G>(
        &mut self,
        name: &str,
        approx: F,
        expected: G,
        interval: Interval,
        tolerance: Option<f64>,
        iterations: Option<u32>,
    ) -> Result<(), PrecError>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
        G: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        let mut options = self.real_options(vec![interval]);
        if let Some(t) = tolerance {
            options.tolerance = t;
        }
        if let Some(n) = iterations {
            options.iterations = n;
        }
        self.estimate(name, approx, expected, options)
    }

    /// Compare two values directly.
    pub fn equals<T: Display>(
        &mut self,
        name: &str,
        evaluated: T,
        expected: T,
        options: &EqualityOptions<T>,
    ) {
        if !self.is_picked(name) {
            return;
        }
        let res = check_equality(name, &evaluated, &expected, options);
        self.record_equation(res);
    }

    /// Compare two reals with absolute distance and an optional tolerance
    /// (the session default otherwise).
    pub fn equals_real(&mut self, name: &str, evaluated: f64, expected: f64, tolerance: Option<f64>) {
        let options = EqualityOptions::default()
            .tolerance(tolerance.unwrap_or(self.settings.default_tolerance));
        self.equals(name, evaluated, expected, &options);
    }

    /// Check every `(evaluated, expected)` pair under the same name.
    pub fn equals_pairs<T: Display>(
        &mut self,
        name: &str,
        pairs: &[(T, T)],
        options: &EqualityOptions<T>,
    ) {
        if !self.is_picked(name) {
            return;
        }
        for (evaluated, expected) in pairs {
            let res = check_equality(name, evaluated, expected, options);
            self.record_equation(res);
        }
    }

    /// Check two equally long sequences element-wise.
    pub fn equals_all<T: Display>(
        &mut self,
        name: &str,
        evaluated: &[T],
        expected: &[T],
        options: &EqualityOptions<T>,
    ) -> Result<(), PrecError> {
        if evaluated.len() != expected.len() {
            return Err(PrecError::LengthMismatch {
                evaluated: evaluated.len(),
                expected: expected.len(),
            });
        }
        if !self.is_picked(name) {
            return Ok(());
        }
        for (a, b) in evaluated.iter().zip(expected) {
            let res = check_equality(name, a, b, options);
            self.record_equation(res);
        }
        Ok(())
    }

    /// Evaluate `f` at each input and compare with the paired expected value.
    ///
    /// A panic in `f` records a failed result for that input and the
    /// remaining cases still run.
    pub fn equals_fn<I, T, F>(
        &mut self,
        name: &str,
        f: F,
        cases: &[(I, T)],
        options: &EqualityOptions<T>,
    ) where
        I: Clone,
        T: Display,
        F: Fn(I) -> T,
    {
        if !self.is_picked(name) {
            return;
        }
        for (input, expected) in cases {
            let input = input.clone();
            let res = match panic::catch_unwind(AssertUnwindSafe(|| f(input))) {
                Ok(evaluated) => check_equality(name, &evaluated, expected, options),
                Err(payload) => {
                    let err = PrecError::from_panic(payload);
                    warn!(test = name, error = %err, "Equality check could not evaluate");
                    EqualityResult {
                        name: name.to_string(),
                        expected: expected.to_string(),
                        tolerance: options.tolerance,
                        quiet: options.quiet,
                        error: Some(err.to_string()),
                        ..EqualityResult::default()
                    }
                }
            };
            self.record_equation(res);
        }
    }

    fn record_equation(&self, res: EqualityResult) {
        lock(&self.store)
            .equations
            .entry(res.name.clone())
            .or_default()
            .push(res);
    }

    fn dispatch<T>(&mut self, task: T)
    where
        T: FnOnce() + Send + 'static,
    {
        if !self.settings.multithreading {
            task();
            return;
        }

        while self.workers.len() >= self.settings.worker_limit() {
            if let Some(handle) = self.workers.pop_front() {
                join_worker(handle);
            }
        }
        self.workers.push_back(thread::spawn(task));
    }

    /// Block until every dispatched test has recorded its result.
    pub fn wait(&mut self) {
        while let Some(handle) = self.workers.pop_front() {
            join_worker(handle);
        }
    }

    /// Counts over every finished test.
    pub fn summary(&mut self) -> SessionSummary {
        self.wait();
        lock(&self.store).summary(&self.settings.module_name)
    }

    /// Snapshot of the estimate results recorded so far.
    pub fn estimates(&mut self) -> ResultMap<EstimateResult> {
        self.wait();
        lock(&self.store).estimates.clone()
    }

    /// Snapshot of the equality results recorded so far.
    pub fn equations(&mut self) -> ResultMap<EqualityResult> {
        self.wait();
        lock(&self.store).equations.clone()
    }

    /// Join all workers and collect the results into a report.
    pub fn finish(mut self) -> SessionReport {
        self.wait();
        let store = mem::take(&mut *lock(&self.store));
        let summary = store.summary(&self.settings.module_name);
        let precision = self.settings.output_precision;

        let estimate_table = ResultTable::resolve(
            ResultKind::Estimate,
            &store.estimates,
            &self.settings.estimate_columns,
            precision,
        );
        let equation_table = ResultTable::resolve(
            ResultKind::Equation,
            &store.equations,
            &self.settings.equation_columns,
            precision,
        );

        info!(
            module = %summary.module,
            total = summary.total_tests,
            failed = summary.failed_tests,
            "Finished precision testing"
        );

        SessionReport {
            summary,
            estimates: store.estimates,
            equations: store.equations,
            estimate_table,
            equation_table,
        }
    }

    /// End the session, hand the results to `sink` and return the counts.
    pub fn end(self, sink: &mut dyn ResultSink) -> Result<SessionSummary, PrecError> {
        let report = self.finish();
        sink.write(&report)?;
        Ok(report.summary)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.wait();
    }
}

fn join_worker(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        error!("Worker thread panicked outside the task boundary");
    }
}

/// Run one estimate with the task boundary around it.
fn run_estimate<I, O>(
    name: &str,
    approx: &dyn Fn(I) -> O,
    expected: &dyn Fn(I) -> O,
    options: &EstimateOptions<I, O>,
) -> EstimateResult {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<EstimateResult, PrecError> {
        let mut res = options.estimator.estimate(approx, expected, options)?;
        res.stamp(name, options);
        res.failed = (options.fail)(&res) || res.has_nan_metric() || res.error.is_some();
        Ok(res)
    }))
    .unwrap_or_else(|payload| Err(PrecError::from_panic(payload)));

    match outcome {
        Ok(res) => {
            debug!(test = name, max_error = res.max_error, failed = res.failed, "Estimate finished");
            res
        }
        Err(err) => {
            warn!(test = name, error = %err, "Estimate could not evaluate");
            EstimateResult::evaluation_failure(name, options, err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn settings(multithreading: bool) -> SessionSettings {
        SessionSettings {
            multithreading,
            seed: 7,
            ..SessionSettings::new("unit")
        }
    }

    #[test]
    fn settings_defaults() {
        let s = SessionSettings::default();
        assert_eq!(s.default_iterations, 1000);
        assert_eq!(s.default_tolerance, 1e-8);
        assert_eq!(s.default_fail, FailMetric::Max);
        assert_eq!(s.estimate_columns, vec!["name", "meanErr", "rmsErr", "maxErr", "failed"]);
        assert_eq!(s.equation_columns, vec!["name", "difference", "tolerance", "failed"]);
        assert!(s.multithreading);
        assert_eq!(s.output_precision, 1);
    }

    #[test]
    fn invalid_iterations_are_rejected_at_the_call() {
        let mut session = Session::with_settings(settings(false), Vec::<String>::new());
        let opt = EstimateOptions::new(vec![Interval::new(0.0, 1.0)]).iterations(0);
        let err = session.estimate("bad", |x: f64| x, |x: f64| x, opt).unwrap_err();
        assert_eq!(err, PrecError::InvalidIterations { iterations: 0 });
        assert_eq!(session.summary().total_tests, 0);
    }

    #[test]
    fn panicking_function_becomes_failed_result() {
        let mut session = Session::with_settings(settings(true), Vec::<String>::new());
        let opt = EstimateOptions::new(vec![Interval::new(0.0, 1.0)]).iterations(10);
        session
            .estimate(
                "explodes",
                |x: f64| {
                    if x > 0.5 {
                        panic!("out of domain");
                    }
                    x
                },
                |x: f64| x,
                opt,
            )
            .unwrap();

        let estimates = session.estimates();
        let r = &estimates["explodes"][0];
        assert!(r.failed);
        assert!(r.max_error.is_nan());
        assert!(r.error.as_deref().unwrap_or_default().contains("out of domain"));
        assert_eq!(session.summary().failed_tests, 1);
    }

    #[test]
    fn zero_measure_domain_fails_even_when_functions_agree() {
        let mut session = Session::with_settings(settings(false), Vec::<String>::new());
        let opt = EstimateOptions::new(vec![Interval::new(2.0, 2.0)]).tolerance(1e-3);
        session.estimate("point", |x: f64| x, |x: f64| x, opt).unwrap();

        let estimates = session.estimates();
        let r = &estimates["point"][0];
        assert_eq!(r.max_error, 0.0);
        assert!(r.mean_error.is_nan());
        assert!(r.failed);
    }

    #[test]
    fn zero_expected_integral_does_not_fail_on_relative_error() {
        let mut session = Session::with_settings(settings(false), Vec::<String>::new());
        let opt = session.real_options(vec![Interval::new(0.0, 3.0)]).tolerance(1e-12);
        session
            .homogeneous("residual", |x: f64| x.sin().powi(2) + x.cos().powi(2) - 1.0, opt)
            .unwrap();

        let estimates = session.estimates();
        let r = &estimates["residual"][0];
        assert!(r.rel_error.is_nan());
        assert!(r.zero_expected);
        assert!(!r.failed, "{r:?}");
    }

    #[test]
    fn picked_tests_filter_registrations() {
        let mut session = Session::with_settings(settings(false), ["keep"]);
        let opt = EstimateOptions::new(vec![Interval::new(0.0, 1.0)]);
        session.estimate("keep", |x: f64| x, |x: f64| x, opt.clone()).unwrap();
        session.estimate("skip", |x: f64| x, |x: f64| x, opt).unwrap();
        session.equals_real("skip", 1.0, 2.0, None);

        let summary = session.summary();
        assert_eq!(summary.total_tests, 1);
        assert_eq!(summary.failed_tests, 0);
    }

    #[test]
    fn equals_all_rejects_length_mismatch() {
        let mut session = Session::with_settings(settings(false), Vec::<String>::new());
        let err = session
            .equals_all("lens", &[1.0, 2.0], &[1.0], &EqualityOptions::default())
            .unwrap_err();
        assert_eq!(err, PrecError::LengthMismatch { evaluated: 2, expected: 1 });
    }

    #[test]
    fn equals_fn_records_one_result_per_case() {
        let mut session = Session::with_settings(settings(false), Vec::<String>::new());
        session.equals_fn(
            "square",
            |x: f64| x * x,
            &[(1.0, 1.0), (2.0, 4.0), (3.0, 10.0)],
            &EqualityOptions::default(),
        );
        let equations = session.equations();
        assert_eq!(equations["square"].len(), 3);
        assert_eq!(session.summary().failed_tests, 1);
    }

    #[test]
    fn results_keep_insertion_order_per_name() {
        let mut session = Session::with_settings(settings(false), Vec::<String>::new());
        for i in 0..5 {
            session.equals_real("seq", i as f64, i as f64, Some(0.0));
        }
        let seq: Vec<String> = session.equations()["seq"]
            .iter()
            .map(|r| r.evaluated.clone())
            .collect();
        assert_eq!(seq, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn end_hands_tables_to_sink() {
        let mut session = Session::with_settings(settings(true), Vec::<String>::new());
        session
            .estimate_on("linear", |x: f64| x, |x: f64| x + 1.0, Interval::new(0.0, 1.0), Some(0.5), None)
            .unwrap();
        session.equals_real("one", 1.0, 1.0, None);

        let mut sink = MemorySink::default();
        let summary = session.end(&mut sink).unwrap();
        assert_eq!(summary.total_tests, 2);
        assert_eq!(summary.failed_tests, 1);
        assert_eq!(summary.exit_code(), 1);

        let report = sink.report.unwrap();
        assert_eq!(report.estimate_table.rows.len(), 1);
        assert_eq!(report.estimate_table.rows[0].values[0], "linear");
        assert_eq!(report.estimate_table.rows[0].values[3], "1.0e0");
        assert_eq!(report.equation_table.rows[0].values[3], "false");
    }

    #[test]
    fn fixed_seed_is_kept() {
        let session = Session::with_settings(settings(false), Vec::<String>::new());
        assert_eq!(session.seed(), 7);
        let clocked = Session::begin("clock", Vec::<String>::new());
        assert_ne!(clocked.seed(), 0);
    }
}
