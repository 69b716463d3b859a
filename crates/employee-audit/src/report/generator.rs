use crate::analysis::DatasetAnalysis;
use crate::error::{AuditError, Result};
use crate::types::{EmployeeDataset, ParseIssue};
use crate::validator::{CheckKind, CheckOutcome};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Number of example reasons kept per check.
const SAMPLE_REASONS: usize = 5;

/// Number of parse issues listed in the report.
const SAMPLE_PARSE_ISSUES: usize = 20;

/// Findings of one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub check: CheckKind,
    pub title: String,
    pub violation_count: usize,
    pub examined: usize,
    pub skipped: usize,
    /// Every distinct offending employee id (or `row <n>`).
    pub offending_ids: Vec<String>,
    pub sample_reasons: Vec<String>,
}

impl CheckSummary {
    pub fn from_outcome(outcome: &CheckOutcome) -> Self {
        Self {
            check: outcome.check,
            title: outcome.check.title().to_string(),
            violation_count: outcome.violation_count(),
            examined: outcome.examined,
            skipped: outcome.skipped,
            offending_ids: outcome.offending_ids(),
            sample_reasons: outcome
                .violations
                .iter()
                .take(SAMPLE_REASONS)
                .map(|v| format!("{}: {}", v.record, v.reason))
                .collect(),
        }
    }

    pub fn passed(&self) -> bool {
        self.violation_count == 0
    }
}

/// Aggregated result of one audit run.
///
/// Serialized as-is for `--json` and `--emit-report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub input_file: Option<String>,
    /// Reference date all date checks compared against.
    pub as_of: NaiveDate,
    pub total_records: usize,
    /// Required columns absent from the input.
    pub missing_columns: Vec<String>,
    /// Missing cells per column, only columns with at least one.
    pub missing_values: BTreeMap<String, usize>,
    pub parse_issue_count: usize,
    /// The first parse issues, for inspection.
    pub parse_issues: Vec<ParseIssue>,
    pub checks: Vec<CheckSummary>,
    pub analysis: Option<DatasetAnalysis>,
    /// Chart files written during the run.
    pub charts: Vec<String>,
}

impl ValidationReport {
    pub fn check(&self, kind: CheckKind) -> Option<&CheckSummary> {
        self.checks.iter().find(|summary| summary.check == kind)
    }

    pub fn total_violations(&self) -> usize {
        self.checks.iter().map(|c| c.violation_count).sum()
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckSummary> {
        self.checks.iter().filter(|c| !c.passed())
    }

    pub fn is_clean(&self) -> bool {
        self.checks.iter().all(CheckSummary::passed)
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Builds, renders and writes [`ValidationReport`]s.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
    sample_size: usize,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./plots"),
            sample_size: 5,
        }
    }
}

impl ReportGenerator {
    /// Create a generator writing into `output_dir`, showing up to
    /// `sample_size` offending ids per check in text output.
    pub fn new(output_dir: PathBuf, sample_size: usize) -> Self {
        Self {
            output_dir,
            sample_size,
        }
    }

    /// Aggregate check outcomes and dataset totals into a report.
    pub fn build_report(
        dataset: &EmployeeDataset,
        outcomes: &[CheckOutcome],
        as_of: NaiveDate,
    ) -> ValidationReport {
        let missing_values = dataset
            .missing_value_counts()
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .collect();

        ValidationReport {
            generated_at: Local::now().to_rfc3339(),
            input_file: dataset
                .source
                .as_ref()
                .map(|path| path.display().to_string()),
            as_of,
            total_records: dataset.len(),
            missing_columns: dataset.missing_columns.clone(),
            missing_values,
            parse_issue_count: dataset.parse_issues.len(),
            parse_issues: dataset
                .parse_issues
                .iter()
                .take(SAMPLE_PARSE_ISSUES)
                .cloned()
                .collect(),
            checks: outcomes.iter().map(CheckSummary::from_outcome).collect(),
            analysis: None,
            charts: Vec::new(),
        }
    }

    /// Console rendering of a report.
    pub fn render_text(&self, report: &ValidationReport) -> String {
        let rule = "=".repeat(72);
        let mut out = String::new();

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "EMPLOYEE DATA VALIDATION REPORT");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(
            out,
            "  Input:            {}",
            report.input_file.as_deref().unwrap_or("<in-memory>")
        );
        let _ = writeln!(out, "  Reference date:   {}", report.as_of);
        let _ = writeln!(out, "  Records:          {}", report.total_records);
        let _ = writeln!(out, "  Parse issues:     {}", report.parse_issue_count);
        let _ = writeln!(
            out,
            "  Missing columns:  {}",
            if report.missing_columns.is_empty() {
                "none".to_string()
            } else {
                report.missing_columns.join(", ")
            }
        );

        if !report.missing_values.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "MISSING VALUES");
            let _ = writeln!(out, "{}", "-".repeat(40));
            for (column, count) in &report.missing_values {
                let _ = writeln!(out, "  {:<24} {}", column, count);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "CHECKS");
        let _ = writeln!(out, "{}", "-".repeat(40));
        for check in &report.checks {
            let status = if check.passed() { " OK " } else { "FAIL" };
            let _ = writeln!(
                out,
                "  [{}] {:<42} {:>6}  (examined {}, skipped {})",
                status, check.title, check.violation_count, check.examined, check.skipped
            );
            if !check.passed() {
                let shown: Vec<&str> = check
                    .offending_ids
                    .iter()
                    .take(self.sample_size)
                    .map(String::as_str)
                    .collect();
                let more = check.offending_ids.len().saturating_sub(shown.len());
                let suffix = if more > 0 {
                    format!(" (+{} more)", more)
                } else {
                    String::new()
                };
                let _ = writeln!(out, "         {}{}", shown.join(", "), suffix);
            }
        }

        if let Some(analysis) = &report.analysis {
            let _ = writeln!(out);
            let _ = writeln!(out, "ANALYSIS");
            let _ = writeln!(out, "{}", "-".repeat(40));
            let _ = writeln!(
                out,
                "  Records analyzed: {} ({} excluded)",
                analysis.records_analyzed, analysis.records_excluded
            );
            for (column, stats) in &analysis.descriptive {
                let _ = writeln!(
                    out,
                    "  {:<18} mean {:>12.2}  std {:>12.2}  min {:>12.2}  median {:>12.2}  max {:>12.2}",
                    column, stats.mean, stats.std, stats.min, stats.median, stats.max
                );
            }
            for (column, test) in &analysis.normality {
                if let (Some(w), Some(p)) = (test.statistic, test.p_value) {
                    let _ = writeln!(
                        out,
                        "  Shapiro-Wilk {:<18} W={:.4} p={:.4} ({})",
                        column,
                        w,
                        p,
                        if test.is_normal { "normal" } else { "not normal" }
                    );
                }
            }
            let _ = writeln!(out, "  Salary outliers (IQR): {}", analysis.salary_outliers);
            for group in &analysis.mean_salary_by_gender {
                let _ = writeln!(
                    out,
                    "  Mean salary [{}]: {:.2} (n={})",
                    group.label, group.mean, group.count
                );
            }
        }

        if !report.charts.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "  Charts written:   {}", report.charts.len());
        }

        let _ = writeln!(out);
        let failed = report.failed_checks().count();
        let _ = writeln!(
            out,
            "Total violations: {} across {} of {} checks",
            report.total_violations(),
            failed,
            report.checks.len()
        );
        let _ = writeln!(out, "{}", rule);
        out
    }

    /// Write `report` as pretty JSON to `<output_dir>/<stem>_report.json`.
    pub fn write_json(&self, report: &ValidationReport, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            AuditError::ReportWriteFailed(format!("{}: {}", self.output_dir.display(), e))
        })?;

        let report_path = self.output_dir.join(format!("{}_report.json", stem));
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&report_path, json).map_err(|e| {
            AuditError::ReportWriteFailed(format!("{}: {}", report_path.display(), e))
        })?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EmployeeRecord, FieldKind, RecordRef};
    use crate::validator::Violation;
    use pretty_assertions::assert_eq;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    fn violation(row: usize, id: &str) -> Violation {
        Violation {
            record: RecordRef {
                row,
                employee_id: Some(id.to_string()),
            },
            reason: "base_salary -10 is negative".to_string(),
        }
    }

    fn dataset() -> EmployeeDataset {
        EmployeeDataset {
            source: Some(PathBuf::from("employees.csv")),
            records: vec![
                EmployeeRecord { row: 0, ..Default::default() },
                EmployeeRecord { row: 1, ..Default::default() },
            ],
            parse_issues: vec![ParseIssue {
                row: 1,
                employee_id: None,
                column: "hire_date".to_string(),
                raw_value: "yesterday".to_string(),
                expected: FieldKind::Date,
            }],
            missing_columns: vec!["ssn".to_string()],
        }
    }

    fn outcomes() -> Vec<CheckOutcome> {
        vec![
            CheckOutcome {
                check: CheckKind::NegativeBaseSalary,
                examined: 2,
                skipped: 0,
                violations: (0..7)
                    .map(|i| violation(i, &format!("EMP00000000{}", i)))
                    .collect(),
            },
            CheckOutcome {
                check: CheckKind::FutureHireDate,
                examined: 2,
                skipped: 0,
                violations: Vec::new(),
            },
        ]
    }

    #[test]
    fn test_build_report_totals() {
        let report = ReportGenerator::build_report(&dataset(), &outcomes(), as_of());

        assert_eq!(report.total_records, 2);
        assert_eq!(report.input_file.as_deref(), Some("employees.csv"));
        assert_eq!(report.missing_columns, vec!["ssn"]);
        assert_eq!(report.parse_issue_count, 1);
        assert_eq!(report.total_violations(), 7);
        assert!(!report.is_clean());
        assert_eq!(report.failed_checks().count(), 1);

        let salary = report.check(CheckKind::NegativeBaseSalary).unwrap();
        assert_eq!(salary.offending_ids.len(), 7);
        assert_eq!(salary.sample_reasons.len(), SAMPLE_REASONS);
        assert!(report.check(CheckKind::FutureHireDate).unwrap().passed());
        assert!(report.check(CheckKind::UnderMinimumAge).is_none());
    }

    #[test]
    fn test_render_text_limits_sample_ids() {
        let report = ReportGenerator::build_report(&dataset(), &outcomes(), as_of());
        let text = ReportGenerator::new(PathBuf::from("unused"), 3).render_text(&report);

        assert!(text.contains("EMPLOYEE DATA VALIDATION REPORT"));
        assert!(text.contains("EMP000000000, EMP000000001, EMP000000002 (+4 more)"));
        assert!(!text.contains("EMP000000003"));
        assert!(text.contains("[FAIL] negative salaries"));
        assert!(text.contains("[ OK ] future hire dates"));
        assert!(text.contains("Total violations: 7 across 1 of 2 checks"));
        assert!(text.contains("Missing columns:  ssn"));
    }

    #[test]
    fn test_write_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let report = ReportGenerator::build_report(&dataset(), &outcomes(), as_of());
        let generator = ReportGenerator::new(dir.path().join("out"), 5);

        let path = generator.write_json(&report, "employees").unwrap();
        assert_eq!(path, dir.path().join("out").join("employees_report.json"));

        let parsed: ValidationReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, report);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["checks"][0]["check"], "negative_base_salary");
        assert_eq!(raw["as_of"], "2025-05-01");
    }
}
