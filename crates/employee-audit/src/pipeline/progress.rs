//! Progress reporting for the audit pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use employee_audit::Audit;
//!
//! let outcome = Audit::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run("employees.csv")?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of an audit run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStage {
    /// Reading the CSV and parsing records
    Loading,
    /// Running the validation checks
    Validating,
    /// Summarizing check outcomes into the report
    Aggregating,
    /// Filtering records and computing statistics
    Analyzing,
    /// Writing chart files
    Rendering,
    /// Run completed successfully
    Complete,
    /// Run failed with an error
    Failed,
}

impl AuditStage {
    /// Label used in log lines.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Records",
            Self::Validating => "Validating Records",
            Self::Aggregating => "Aggregating Findings",
            Self::Analyzing => "Analyzing Data",
            Self::Rendering => "Rendering Charts",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run taken by this stage (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.20,
            Self::Validating => 0.25,
            Self::Aggregating => 0.05,
            Self::Analyzing => 0.20,
            Self::Rendering => 0.30,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Validating => 0.20,
            Self::Aggregating => 0.45,
            Self::Analyzing => 0.50,
            Self::Rendering => 0.70,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// One progress update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: AuditStage,

    /// Fraction of the whole run completed, in [0, 1]
    pub progress: f32,

    /// Fraction of the current stage completed, in [0, 1]
    pub stage_progress: f32,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_processed: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_total: Option<usize>,
}

impl ProgressUpdate {
    pub fn new(stage: AuditStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }

    /// Update carrying item counts, e.g. checks run so far.
    pub fn with_items(
        stage: AuditStage,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let stage_progress = if total > 0 {
            current as f32 / total as f32
        } else {
            0.0
        };
        Self {
            items_processed: Some(current),
            items_total: Some(total),
            ..Self::new(stage, stage_progress, message)
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(AuditStage::Complete, 1.0, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(AuditStage::Failed, 0.0, message)
    }
}

/// Receives progress updates during an audit run.
///
/// # Example
///
/// ```rust,ignore
/// use employee_audit::{ProgressReporter, ProgressUpdate};
///
/// struct StderrReporter;
///
/// impl ProgressReporter for StderrReporter {
///     fn report(&self, update: ProgressUpdate) {
///         eprintln!("{}: {}", update.stage.display_name(), update.message);
///     }
/// }
/// ```
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Adapts a closure into a [`ProgressReporter`].
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}
