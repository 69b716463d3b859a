//! Pipeline module.
//!
//! Wires the loader, validator, report generator, analyzer and chart
//! renderer into one audit run.

mod audit;
pub mod progress;

pub use audit::{Audit, AuditBuilder, AuditOutcome};
pub use progress::{AuditStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
