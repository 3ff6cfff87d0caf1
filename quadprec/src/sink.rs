//! Handing completed results to an output collaborator.
//!
//! At the end of a session the results are grouped by kind, resolved into
//! string tables through [`ResolveField`], and passed to a [`ResultSink`]
//! together with the raw records and the summary counts.

use crate::error::PrecError;
use crate::field::{field_title, ResolveField};
use crate::result::{EqualityResult, EstimateResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// Results keyed by test name, in insertion order per name.
pub type ResultMap<R> = BTreeMap<String, Vec<R>>;

/// Which kind of check produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Estimate,
    Equation,
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultKind::Estimate => write!(f, "estimate"),
            ResultKind::Equation => write!(f, "equation"),
        }
    }
}

/// One printable row of a result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub name: String,
    pub values: Vec<String>,
    pub failed: bool,
}

/// Results of one kind, resolved into strings for the selected columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub kind: ResultKind,
    /// Field selectors, e.g. `"meanErr"`.
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    /// Resolve every non-quiet result into a row.
    pub fn resolve<R: ResolveField>(
        kind: ResultKind,
        results: &ResultMap<R>,
        columns: &[String],
        precision: usize,
    ) -> Self {
        let rows = results
            .values()
            .flatten()
            .filter(|r| !r.quiet())
            .map(|r| ResultRow {
                name: r.test_name().to_string(),
                values: columns
                    .iter()
                    .map(|c| r.resolve_field(c, precision))
                    .collect(),
                failed: r.failed(),
            })
            .collect();

        Self {
            kind,
            columns: columns.to_vec(),
            rows,
        }
    }

    /// Column titles for display.
    pub fn titles(&self) -> Vec<&str> {
        self.columns.iter().map(|c| field_title(c)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Counts reported when a session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub module: String,
    pub total_tests: usize,
    pub failed_tests: usize,
}

impl SessionSummary {
    /// Percentage of failed tests, 0 when nothing ran.
    pub fn failure_percent(&self) -> f64 {
        if self.total_tests == 0 {
            0.0
        } else {
            self.failed_tests as f64 / self.total_tests as f64 * 100.0
        }
    }

    pub fn passed(&self) -> bool {
        self.failed_tests == 0
    }

    /// Process exit status: the number of failed tests.
    pub fn exit_code(&self) -> i32 {
        i32::try_from(self.failed_tests).unwrap_or(i32::MAX)
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} total tests, {} failed ({:.2}%)",
            self.module,
            self.total_tests,
            self.failed_tests,
            self.failure_percent()
        )
    }
}

/// Everything a session produced, as handed to a [`ResultSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub summary: SessionSummary,
    pub estimates: ResultMap<EstimateResult>,
    pub equations: ResultMap<EqualityResult>,
    pub estimate_table: ResultTable,
    pub equation_table: ResultTable,
}

impl SessionReport {
    pub fn tables(&self) -> [&ResultTable; 2] {
        [&self.estimate_table, &self.equation_table]
    }
}

/// Output collaborator receiving the completed results of a session.
pub trait ResultSink {
    fn write(&mut self, report: &SessionReport) -> Result<(), PrecError>;
}

/// Keeps the last report in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub report: Option<SessionReport>,
}

impl ResultSink for MemorySink {
    fn write(&mut self, report: &SessionReport) -> Result<(), PrecError> {
        self.report = Some(report.clone());
        Ok(())
    }
}

/// Emits every row and the summary as `tracing` events.
#[derive(Debug, Default)]
pub struct LogSink;

impl ResultSink for LogSink {
    fn write(&mut self, report: &SessionReport) -> Result<(), PrecError> {
        for table in report.tables() {
            for row in &table.rows {
                let fields = table
                    .columns
                    .iter()
                    .zip(&row.values)
                    .map(|(c, v)| format!("{c}={v}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                info!(kind = %table.kind, failed = row.failed, "{fields}");
            }
        }
        info!(
            module = %report.summary.module,
            total = report.summary.total_tests,
            failed = report.summary.failed_tests,
            "{}",
            report.summary
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(name: &str, failed: bool, quiet: bool) -> EstimateResult {
        EstimateResult {
            name: name.to_string(),
            max_error: 0.5,
            failed,
            quiet,
            ..EstimateResult::default()
        }
    }

    #[test]
    fn tables_skip_quiet_results_and_keep_order() {
        let mut results: ResultMap<EstimateResult> = BTreeMap::new();
        results
            .entry("b".to_string())
            .or_default()
            .extend([estimate("b", false, false), estimate("b", true, false)]);
        results
            .entry("a".to_string())
            .or_default()
            .push(estimate("a", false, true));

        let columns = vec!["name".to_string(), "maxErr".to_string()];
        let table = ResultTable::resolve(ResultKind::Estimate, &results, &columns, 1);

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].values, vec!["b", "5.0e-1"]);
        assert!(!table.rows[0].failed);
        assert!(table.rows[1].failed);
        assert_eq!(table.titles(), vec!["Function", "Max Err."]);
    }

    #[test]
    fn summary_percent_and_exit_code() {
        let s = SessionSummary {
            module: "m".to_string(),
            total_tests: 4,
            failed_tests: 1,
        };
        assert_eq!(s.failure_percent(), 25.0);
        assert_eq!(s.exit_code(), 1);
        assert!(!s.passed());
        assert_eq!(s.to_string(), "m: 4 total tests, 1 failed (25.00%)");

        let empty = SessionSummary {
            module: "m".to_string(),
            total_tests: 0,
            failed_tests: 0,
        };
        assert_eq!(empty.failure_percent(), 0.0);
        assert_eq!(empty.exit_code(), 0);
    }
}
