//! Report generation module.
//!
//! Aggregates check outcomes and dataset totals into a
//! [`ValidationReport`], which renders as console text or serializes to JSON
//! for the `--json` and `--emit-report` CLI flags.
//!
//! # Example
//!
//! ```rust,ignore
//! use employee_audit::report::ReportGenerator;
//!
//! let report = ReportGenerator::build_report(&dataset, &outcomes, as_of);
//! let generator = ReportGenerator::new(PathBuf::from("plots"), 5);
//! println!("{}", generator.render_text(&report));
//! generator.write_json(&report, "employees")?;
//! ```

mod generator;

pub use generator::{CheckSummary, ReportGenerator, ValidationReport};
