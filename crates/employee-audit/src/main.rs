//! CLI entry point for the employee records audit.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use dotenv::dotenv;
use employee_audit::{Audit, AuditConfig, AuditOutcome};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

/// Exit status when `--fail-on-violations` is set and a check failed.
const VIOLATIONS_EXIT_CODE: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Employee records data-quality audit",
    long_about = "Validates an employee CSV against a fixed set of data-quality checks, \
                  prints a report and writes descriptive charts.\n\n\
                  EXAMPLES:\n  \
                  # Validate and draw charts into ./plots\n  \
                  employee-audit -i employees.csv\n\n  \
                  # Reproducible run against a fixed reference date\n  \
                  employee-audit -i employees.csv --as-of 2025-05-01\n\n  \
                  # Machine-readable output, non-zero exit on findings\n  \
                  employee-audit -i employees.csv --json --no-charts --fail-on-violations"
)]
struct Args {
    /// Path to the employee CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for charts and the JSON report [default: ./plots]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Reference date for date checks (YYYY-MM-DD). Defaults to today
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,

    /// Allowed drift in days between days_service and hire_date
    #[arg(long)]
    tolerance_days: Option<i64>,

    /// Minimum employee age in years
    #[arg(long)]
    min_age: Option<u32>,

    /// Offending ids shown per check in the console report
    #[arg(long)]
    sample_size: Option<usize>,

    /// JSON configuration file; command line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail when required columns are missing
    #[arg(long)]
    strict_columns: bool,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Print the JSON report to stdout instead of the text report
    ///
    /// Disables all logging so stdout only contains JSON.
    #[arg(long)]
    json: bool,

    /// Write the JSON report to the output directory as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Exit with status 2 when any check reports violations
    #[arg(long)]
    fail_on_violations: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{}': {}", value, e))
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled so stdout only carries
/// the JSON report.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    // Load .env before the subscriber reads RUST_LOG
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    match run(&args) {
        Ok(outcome) => {
            if args.fail_on_violations && !outcome.report.is_clean() {
                ExitCode::from(VIOLATIONS_EXIT_CODE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<AuditOutcome> {
    let config = build_config(args)?;

    let mut builder = Audit::builder().config(config);
    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let audit = builder.build()?;

    info!("{}", "=".repeat(80));
    info!("Auditing {} (as of {})", args.input.display(), audit.as_of());
    info!("{}", "=".repeat(80));

    let outcome = audit
        .run(&args.input)
        .map_err(|e| anyhow!("Audit failed: {}", e))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    } else {
        print!("{}", audit.report_generator().render_text(&outcome.report));
    }

    if args.emit_report {
        let stem = extract_file_stem(&args.input);
        let path = audit
            .report_generator()
            .write_json(&outcome.report, &stem)?;
        if !args.json {
            println!("Report written to {}", path.display());
        }
    }

    Ok(outcome)
}

/// Merge the optional config file with command line overrides.
fn build_config(args: &Args) -> Result<AuditConfig> {
    let base = match &args.config {
        Some(path) => AuditConfig::from_json_file(path)
            .with_context(|| format!("Loading config from {}", path.display()))?,
        None => AuditConfig::default(),
    };

    let mut builder = AuditConfig::builder().base(base);

    if let Some(dir) = &args.output {
        builder = builder.output_dir(dir);
    }
    if let Some(date) = args.as_of {
        builder = builder.as_of(date);
    }
    if let Some(days) = args.tolerance_days {
        builder = builder.days_service_tolerance(days);
    }
    if let Some(years) = args.min_age {
        builder = builder.minimum_age(years);
    }
    if let Some(size) = args.sample_size {
        builder = builder.sample_size(size);
    }
    if args.strict_columns {
        builder = builder.strict_columns(true);
    }
    if args.no_charts {
        builder = builder.render_charts(false);
    }

    Ok(builder.build()?)
}

fn extract_file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("employees")
        .to_string()
}
