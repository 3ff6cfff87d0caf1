//! quadprec precision validation CLI
//!
//! Run configured precision test suites and report their error metrics.
//!
//! # Usage
//!
//! ```bash
//! # Run all tests in validate.yaml (or the built-in suite)
//! quadprec-validate run
//!
//! # Run specific tests
//! quadprec-validate run sqrt_approx reciprocal
//!
//! # List available tests and functions
//! quadprec-validate list
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use quadprec_validate::{
    catalog,
    config::ValidationConfig,
    report::ReportSink,
    runner::ValidationRunner,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quadprec-validate")]
#[command(about = "Estimate the precision of approximate real functions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to validation config YAML
    #[arg(short, long, default_value = "validate.yaml")]
    config: PathBuf,

    /// Output directory for CSV tables
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write CSV tables
    #[arg(long)]
    csv: bool,

    /// Output JSON report path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Seed for random sampling (0 seeds from the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Run every test on the calling thread
    #[arg(long)]
    single_threaded: bool,

    /// Log verbosity (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run precision tests
    Run {
        /// Tests to run (all when empty)
        tests: Vec<String>,
    },

    /// List configured tests and catalog functions
    List,

    /// Generate default validation config
    Init,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match &cli.command {
        Some(Commands::List) => list_tests(&cli)?,
        Some(Commands::Init) => init_config(&cli)?,
        Some(Commands::Run { tests }) => run_validation(&cli, tests)?,
        None => run_validation(&cli, &[])?,
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ValidationConfig> {
    if cli.config.exists() {
        Ok(ValidationConfig::load(&cli.config)?)
    } else {
        println!("  {} Config not found, using defaults", "⚠".yellow());
        Ok(ValidationConfig::default_config())
    }
}

fn run_validation(cli: &Cli, tests: &[String]) -> anyhow::Result<()> {
    println!("{} Loading configuration...", "▶".blue());
    let mut config = load_config(cli)?;

    if let Some(ref dir) = cli.output {
        config.output.directory = dir.clone();
    }
    if cli.csv {
        config.output.csv = true;
    }
    if let Some(ref path) = cli.json {
        config.output.json = Some(path.clone());
    }
    if let Some(seed) = cli.seed {
        config.session.seed = seed;
    }
    if cli.single_threaded {
        config.session.multithreading = false;
    }

    let selected = if tests.is_empty() {
        config.tests.len()
    } else {
        tests.len()
    };
    println!(
        "{} Running {} test(s) of module {}...",
        "▶".blue(),
        selected,
        config.session.module_name.bold()
    );

    let mut sink = ReportSink::new(config.output.clone());
    let runner = ValidationRunner::new(config);
    let summary = runner.run_into(tests, &mut sink)?;

    if let Some(ref path) = runner.config().output.json {
        println!("Report saved to: {}", path.display());
    }

    if !summary.passed() {
        std::process::exit(summary.exit_code());
    }

    Ok(())
}

fn list_tests(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;

    println!("{}", "Configured Tests".bold());
    println!("{}", "─".repeat(50));

    for (name, test) in &config.tests {
        println!(
            "  • {} [{}] - {}",
            name.green(),
            test.kind(),
            test.description().dimmed()
        );
        println!("    Functions: {}", test.functions().join(", "));
        if let Some(q) = test.quadrature() {
            let domain = q
                .domain
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            println!("    Domain: {}", domain);
        }
    }

    println!("\n{}", "Catalog Functions".bold());
    println!("{}", "─".repeat(50));
    for entry in catalog::entries() {
        println!("  • {} - {}", entry.name.blue(), entry.description.dimmed());
    }

    Ok(())
}

fn init_config(cli: &Cli) -> anyhow::Result<()> {
    let config = ValidationConfig::default_config();
    config.save(&cli.config)?;

    println!("{} Created default config at: {}", "✓".green(), cli.config.display());
    println!("\nEdit this file to add your own test cases.");

    Ok(())
}
