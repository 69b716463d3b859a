//! Employee Records Audit Library
//!
//! Data-quality validation and descriptive charts for employee record
//! datasets, built with Rust and Polars.
//!
//! # Overview
//!
//! An audit run goes through five stages:
//!
//! - **Loading**: the CSV is read with polars as raw text and parsed into
//!   typed [`EmployeeRecord`]s; unparsable cells become [`ParseIssue`]s
//! - **Validation**: twelve independent checks (format, range, duplicate and
//!   cross-field consistency) each produce a list of offending records
//! - **Aggregation**: findings are summarized into a [`ValidationReport`]
//! - **Analysis**: records passing the cleaning filter feed descriptive
//!   statistics, group means and Shapiro-Wilk normality tests
//! - **Rendering**: fifteen SVG charts are written to the output directory
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use employee_audit::{Audit, AuditConfig};
//! use chrono::NaiveDate;
//!
//! let config = AuditConfig::builder()
//!     .as_of(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap())
//!     .output_dir("plots")
//!     .build()?;
//!
//! let outcome = Audit::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run("employees.csv")?;
//!
//! for check in outcome.report.failed_checks() {
//!     println!("{}: {}", check.title, check.violation_count);
//! }
//! ```
//!
//! # Running single checks
//!
//! The validator can be used without the rest of the pipeline:
//!
//! ```rust,ignore
//! use employee_audit::{CheckContext, CheckKind, EmployeeLoader, Validator};
//!
//! let dataset = EmployeeLoader::default().load_path("employees.csv")?;
//! let validator = Validator::new(CheckContext::new(as_of))
//!     .with_checks([CheckKind::UnderMinimumAge, CheckKind::DaysServiceMismatch]);
//! let outcomes = validator.run(&dataset.records);
//! ```

pub mod analysis;
pub mod charts;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod utils;
pub mod validator;

// Re-exports for convenient access
pub use analysis::{Analyzer, DatasetAnalysis, DescriptiveStats, GroupStat, NormalityTest};
pub use charts::{ChartKind, ChartRenderer};
pub use config::{AuditConfig, AuditConfigBuilder, ConfigValidationError};
pub use error::{AuditError, Result as AuditResult, ResultExt};
pub use loader::EmployeeLoader;
pub use pipeline::{
    Audit, AuditBuilder, AuditOutcome, AuditStage, ClosureProgressReporter, ProgressReporter,
    ProgressUpdate,
};
pub use report::{CheckSummary, ReportGenerator, ValidationReport};
pub use types::{EmployeeDataset, EmployeeRecord, FieldKind, ParseIssue, RecordRef};
pub use utils::{is_error_marker, parse_date_string, parse_numeric_string};
pub use validator::{CheckContext, CheckKind, CheckOutcome, Validator, Violation};
