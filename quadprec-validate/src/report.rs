//! Validation report generation and display.
//!
//! [`ReportSink`] receives the results of a session and turns them into a
//! [`ValidationReport`], which can be printed to the terminal, written as
//! CSV tables, or saved as JSON.
//!
//! # JSON Format
//!
//! The JSON output includes:
//! - Timestamp and git commit (if available)
//! - The session summary (total and failed counts)
//! - Every estimate and equality result, keyed by test name

use crate::config::OutputConfig;
use quadprec::error::PrecError;
use quadprec::result::{EqualityResult, EstimateResult};
use quadprec::sink::{ResultMap, ResultSink, ResultTable, SessionReport, SessionSummary};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Full validation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Timestamp of the validation run.
    pub timestamp: String,
    /// Git commit hash (if available).
    pub git_commit: Option<String>,
    pub summary: SessionSummary,
    pub estimates: ResultMap<EstimateResult>,
    pub equations: ResultMap<EqualityResult>,
    #[serde(skip)]
    tables: Vec<ResultTable>,
}

impl ValidationReport {
    pub fn new(report: &SessionReport) -> Self {
        Self {
            timestamp: chrono_lite_timestamp(),
            git_commit: get_git_commit(),
            summary: report.summary.clone(),
            estimates: report.estimates.clone(),
            equations: report.equations.clone(),
            tables: report.tables().into_iter().cloned().collect(),
        }
    }

    /// Save report to JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Write one CSV file per non-empty result table into `dir`.
    ///
    /// Files are named `<module>_<kind>s.csv`. Returns the written paths.
    pub fn write_csv(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, std::io::Error> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for table in self.tables.iter().filter(|t| !t.is_empty()) {
            let path = dir.join(format!("{}_{}s.csv", self.summary.module, table.kind));
            let mut file = std::io::BufWriter::new(std::fs::File::create(&path)?);
            write_csv_table(&mut file, table)?;
            file.flush()?;
            written.push(path);
        }
        Ok(written)
    }

    /// Print human-readable summary to terminal.
    pub fn print_summary(&self) {
        use colored::Colorize;

        println!("\n{}", "═".repeat(60).bold());
        println!("{}", " QUADPREC PRECISION REPORT ".bold().on_blue());
        println!("{}", "═".repeat(60).bold());

        if let Some(ref commit) = self.git_commit {
            println!("Git commit: {}", commit.dimmed());
        }
        println!("Timestamp:  {}", self.timestamp.dimmed());
        println!("Module:     {}", self.summary.module);
        println!();

        for (name, results) in &self.estimates {
            for r in results.iter().filter(|r| !r.quiet) {
                let status = if r.failed { "✗".red() } else { "✓".green() };
                println!(
                    "  {} {} | max {:.2e} | mean {:.2e} | tol {:.1e}",
                    status, name, r.max_error, r.mean_error, r.tolerance
                );
                if let Some(ref err) = r.error {
                    println!("    {} {}", "Error:".red(), err);
                }
            }
        }
        for (name, results) in &self.equations {
            for r in results.iter().filter(|r| !r.quiet) {
                let status = if r.failed { "✗".red() } else { "✓".green() };
                println!(
                    "  {} {} | {} vs {} | diff {:.2e}",
                    status, name, r.evaluated, r.expected, r.difference
                );
                if let Some(ref err) = r.error {
                    println!("    {} {}", "Error:".red(), err);
                }
            }
        }

        println!("{}", "─".repeat(60));
        let overall_status = if self.summary.passed() {
            "ALL TESTS PASSED".green().bold()
        } else {
            format!("{} TESTS FAILED", self.summary.failed_tests).red().bold()
        };
        println!(
            "{} | {} total, {} failed ({:.2}%)",
            overall_status,
            self.summary.total_tests,
            self.summary.failed_tests,
            self.summary.failure_percent()
        );
        println!("{}\n", "═".repeat(60).bold());
    }

    /// Print the result tables with the configured columns.
    pub fn print_tables(&self) {
        for table in self.tables.iter().filter(|t| !t.is_empty()) {
            println!("\n{} results:\n{}", table.kind, render_table(table));
        }
    }
}

/// Render a result table with `tabled`, marking failed rows.
pub fn render_table(table: &ResultTable) -> String {
    use colored::Colorize;
    use tabled::builder::Builder;

    let mut builder = Builder::default();
    builder.push_record(table.titles().into_iter().map(String::from));
    for row in &table.rows {
        builder.push_record(table.columns.iter().zip(&row.values).map(|(column, value)| {
            if column == "failed" {
                if row.failed {
                    "FAIL".red().to_string()
                } else {
                    "PASS".green().to_string()
                }
            } else {
                value.clone()
            }
        }));
    }
    builder.build().to_string()
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write a table as CSV: a header of field names, then one line per row.
pub fn write_csv_table<W: Write>(out: &mut W, table: &ResultTable) -> std::io::Result<()> {
    let header: Vec<String> = table.columns.iter().map(|c| csv_field(c)).collect();
    writeln!(out, "{}", header.join(","))?;
    for row in &table.rows {
        let line: Vec<String> = row.values.iter().map(|v| csv_field(v)).collect();
        writeln!(out, "{}", line.join(","))?;
    }
    Ok(())
}

/// A [`ResultSink`] printing and saving a [`ValidationReport`].
pub struct ReportSink {
    output: OutputConfig,
    print: bool,
    report: Option<ValidationReport>,
}

impl ReportSink {
    pub fn new(output: OutputConfig) -> Self {
        Self {
            output,
            print: true,
            report: None,
        }
    }

    /// Skip terminal output, only write files.
    pub fn silent(output: OutputConfig) -> Self {
        Self {
            print: false,
            ..Self::new(output)
        }
    }

    /// The report built by the last [`ResultSink::write`].
    pub fn report(&self) -> Option<&ValidationReport> {
        self.report.as_ref()
    }

    pub fn into_report(self) -> Option<ValidationReport> {
        self.report
    }
}

impl ResultSink for ReportSink {
    fn write(&mut self, session: &SessionReport) -> Result<(), PrecError> {
        let report = ValidationReport::new(session);

        if self.print {
            if self.output.print_tables {
                report.print_tables();
            }
            report.print_summary();
        }

        if self.output.csv {
            for path in report.write_csv(&self.output.directory)? {
                info!(path = %path.display(), "Wrote CSV table");
            }
        }
        if let Some(ref path) = self.output.json {
            report.save_json(path)?;
            info!(path = %path.display(), "Wrote JSON report");
        }

        self.report = Some(report);
        Ok(())
    }
}

/// Get a simple timestamp without pulling in chrono.
fn chrono_lite_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", duration.as_secs())
}

/// Try to get the current git commit hash.
fn get_git_commit() -> Option<String> {
    std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .and_then(|o| {
            if o.status.success() {
                String::from_utf8(o.stdout).ok().map(|s| s.trim().to_string())
            } else {
                None
            }
        })
}
