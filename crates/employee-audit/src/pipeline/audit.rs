use super::progress::{AuditStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
use crate::analysis::Analyzer;
use crate::charts::ChartRenderer;
use crate::config::{AuditConfig, ConfigValidationError};
use crate::error::{AuditError, Result};
use crate::loader::EmployeeLoader;
use crate::report::{ReportGenerator, ValidationReport};
use crate::types::EmployeeDataset;
use crate::validator::{CheckContext, CheckOutcome, Validator};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Everything produced by one audit run.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub dataset: EmployeeDataset,
    pub outcomes: Vec<CheckOutcome>,
    pub report: ValidationReport,
    /// Chart files written, empty when rendering was disabled.
    pub charts: Vec<PathBuf>,
}

/// The audit pipeline: load, validate, aggregate, analyze, render.
///
/// # Example
///
/// ```rust,ignore
/// use employee_audit::{Audit, AuditConfig};
///
/// let config = AuditConfig::builder().output_dir("plots").build()?;
/// let outcome = Audit::builder().config(config).build()?.run("employees.csv")?;
/// println!("{} violations", outcome.report.total_violations());
/// ```
pub struct Audit {
    config: AuditConfig,
    as_of: NaiveDate,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    loader: EmployeeLoader,
    reporter: ReportGenerator,
}

static_assertions::assert_impl_all!(Audit: Send, Sync);

impl Audit {
    pub fn builder() -> AuditBuilder {
        AuditBuilder::default()
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Reference date used by every date check of this audit.
    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn report_generator(&self) -> &ReportGenerator {
        &self.reporter
    }

    /// Audit a CSV file.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<AuditOutcome> {
        let path = path.as_ref();
        self.finish(self.run_path(path))
    }

    /// Audit an already loaded dataset.
    pub fn run_dataset(&self, dataset: EmployeeDataset) -> Result<AuditOutcome> {
        self.finish(self.process(dataset))
    }

    fn finish(&self, result: Result<AuditOutcome>) -> Result<AuditOutcome> {
        match result {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Audit complete: {} violations",
                    outcome.report.total_violations()
                )));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Audit error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_path(&self, path: &Path) -> Result<AuditOutcome> {
        self.report_progress(ProgressUpdate::new(
            AuditStage::Loading,
            0.0,
            format!("Loading {}", path.display()),
        ));
        let dataset = self.loader.load_path(path)?;
        self.process(dataset)
    }

    fn process(&self, dataset: EmployeeDataset) -> Result<AuditOutcome> {
        let start_time = Instant::now();
        self.report_progress(ProgressUpdate::new(
            AuditStage::Loading,
            1.0,
            format!("Loaded {} records", dataset.len()),
        ));

        // Validation
        let context = CheckContext::from_config(&self.config, self.as_of);
        let validator = Validator::new(context);
        let total_checks = validator.checks().len();
        let mut outcomes = Vec::with_capacity(total_checks);
        for (index, kind) in validator.checks().iter().enumerate() {
            self.report_progress(ProgressUpdate::with_items(
                AuditStage::Validating,
                index,
                total_checks,
                format!("Checking {}", kind.title()),
            ));
            outcomes.push(validator.run_check(*kind, &dataset.records));
        }

        // Aggregation
        self.report_progress(ProgressUpdate::new(
            AuditStage::Aggregating,
            0.0,
            "Summarizing findings",
        ));
        let mut report = ReportGenerator::build_report(&dataset, &outcomes, self.as_of);
        info!(
            "{} violations across {} failing checks",
            report.total_violations(),
            report.failed_checks().count()
        );

        // Analysis
        self.report_progress(ProgressUpdate::new(
            AuditStage::Analyzing,
            0.0,
            "Computing descriptive statistics",
        ));
        let analyzer = Analyzer::new(&self.config, context);
        let frame = analyzer
            .frame(&dataset.records)
            .map_err(|e| AuditError::AnalysisFailed(format!("{:#}", e)))?;
        let analysis = analyzer
            .analyze(&frame, dataset.len())
            .map_err(|e| AuditError::AnalysisFailed(format!("{:#}", e)))?;

        // Charts
        let charts = if self.config.render_charts {
            self.report_progress(ProgressUpdate::new(
                AuditStage::Rendering,
                0.0,
                format!("Rendering charts to {}", self.config.output_dir.display()),
            ));
            ChartRenderer::from_config(&self.config).render_all(&frame, &analysis)?
        } else {
            info!("Chart rendering disabled");
            Vec::new()
        };

        report.analysis = Some(analysis);
        report.charts = charts.iter().map(|p| p.display().to_string()).collect();

        info!(
            "Audit finished in {} ms",
            start_time.elapsed().as_millis()
        );

        Ok(AuditOutcome {
            dataset,
            outcomes,
            report,
            charts,
        })
    }
}

/// Builder for [`Audit`].
#[derive(Default)]
pub struct AuditBuilder {
    config: Option<AuditConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(AuditBuilder: Send);

impl AuditBuilder {
    pub fn config(mut self, config: AuditConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during the run.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// Convenience for [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the audit. Returns an error if the configuration is invalid.
    ///
    /// The reference date is fixed here, so a run spanning midnight still
    /// uses one date throughout.
    pub fn build(self) -> std::result::Result<Audit, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let reporter = ReportGenerator::new(config.output_dir.clone(), config.sample_size);

        Ok(Audit {
            as_of: config.effective_as_of(),
            loader: EmployeeLoader::from_config(&config),
            progress_reporter: self.progress_reporter,
            reporter,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmployeeRecord;
    use crate::validator::CheckKind;
    use std::sync::Mutex;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    fn config() -> AuditConfig {
        AuditConfig::builder()
            .as_of(as_of())
            .render_charts(false)
            .build()
            .unwrap()
    }

    fn dataset() -> EmployeeDataset {
        let record = |row: usize, salary: f64| EmployeeRecord {
            row,
            employee_id: Some(format!("EMP{:09}", row + 1)),
            base_salary: Some(salary),
            hire_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            days_service: Some(365.0),
            performance_score: Some(80.0),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1),
            ..Default::default()
        };
        EmployeeDataset {
            records: vec![record(0, 50_000.0), record(1, -10.0), record(2, 61_000.0)],
            ..Default::default()
        }
    }

    #[test]
    fn test_builder_default() {
        let audit = Audit::builder().build().unwrap();
        assert_eq!(audit.config().days_service_tolerance, 30);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = AuditConfig {
            days_service_tolerance: -1,
            ..Default::default()
        };
        assert!(Audit::builder().config(config).build().is_err());
    }

    #[test]
    fn test_run_dataset_collects_findings() {
        let audit = Audit::builder().config(config()).build().unwrap();
        let outcome = audit.run_dataset(dataset()).unwrap();

        assert_eq!(outcome.outcomes.len(), CheckKind::ALL.len());
        let negative = outcome.report.check(CheckKind::NegativeBaseSalary).unwrap();
        assert_eq!(negative.offending_ids, vec!["EMP000000002"]);
        assert_eq!(outcome.report.total_violations(), 1);

        let analysis = outcome.report.analysis.as_ref().unwrap();
        assert_eq!(analysis.records_analyzed, 2);
        assert!(outcome.charts.is_empty());
    }

    #[test]
    fn test_progress_reaches_completion() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stages);

        let audit = Audit::builder()
            .config(config())
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap();
        audit.run_dataset(dataset()).unwrap();

        let stages = stages.lock().unwrap();
        assert_eq!(stages.first(), Some(&AuditStage::Loading));
        assert!(stages.contains(&AuditStage::Validating));
        assert!(stages.contains(&AuditStage::Analyzing));
        assert!(!stages.contains(&AuditStage::Rendering));
        assert_eq!(stages.last(), Some(&AuditStage::Complete));
    }

    #[test]
    fn test_missing_input_reports_failure() {
        let failed = Arc::new(Mutex::new(false));
        let sink = Arc::clone(&failed);

        let audit = Audit::builder()
            .config(config())
            .on_progress(move |update| {
                if update.stage == AuditStage::Failed {
                    *sink.lock().unwrap() = true;
                }
            })
            .build()
            .unwrap();

        let error = audit.run("/no/such/employees.csv").unwrap_err();
        assert_eq!(error.error_code(), "INPUT_NOT_FOUND");
        assert!(*failed.lock().unwrap());
    }
}
