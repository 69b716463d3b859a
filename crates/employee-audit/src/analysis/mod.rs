//! Descriptive analysis module.
//!
//! Keeps the records that pass the cleaning filter, builds a typed polars
//! frame from them and computes summary statistics, group means and
//! normality tests. The same frame feeds the chart renderer.

pub mod frame;
pub mod normality;
pub mod statistics;

pub use frame::{build_analysis_frame, is_analyzable};
pub use normality::NormalityTest;
pub use statistics::{CategoryCount, DescriptiveStats, GroupStat, HistogramBin};

use crate::config::AuditConfig;
use crate::types::EmployeeRecord;
use crate::validator::CheckContext;
use anyhow::Result;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Columns that get a `describe()` summary and a normality test.
pub const DESCRIBED_COLUMNS: [&str; 3] = ["base_salary", "performance_score", "vacation_days"];

/// Result of analyzing the cleaned dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetAnalysis {
    /// Records that passed the cleaning filter.
    pub records_analyzed: usize,
    /// Records dropped by the cleaning filter.
    pub records_excluded: usize,
    /// Summary per column in [`DESCRIBED_COLUMNS`] that has values.
    pub descriptive: BTreeMap<String, DescriptiveStats>,
    pub normality: BTreeMap<String, NormalityTest>,
    /// Number of salaries outside the Tukey fences.
    pub salary_outliers: usize,
    pub mean_salary_by_gender: Vec<GroupStat>,
    pub mean_salary_by_department: Vec<GroupStat>,
}

impl DatasetAnalysis {
    pub fn stats(&self, column: &str) -> Option<&DescriptiveStats> {
        self.descriptive.get(column)
    }
}

/// Cleans records and computes the descriptive analysis.
#[derive(Debug, Clone)]
pub struct Analyzer {
    context: CheckContext,
    min_samples: usize,
    max_samples: usize,
    seed: u64,
}

impl Analyzer {
    pub fn new(config: &AuditConfig, context: CheckContext) -> Self {
        Self {
            context,
            min_samples: config.normality_min_samples,
            max_samples: config.normality_max_samples,
            seed: config.normality_seed,
        }
    }

    /// Frame of the records that pass the cleaning filter.
    pub fn frame(&self, records: &[EmployeeRecord]) -> Result<DataFrame> {
        let df = build_analysis_frame(records, &self.context)?;
        info!(
            "{} of {} records retained for analysis",
            df.height(),
            records.len()
        );
        Ok(df)
    }

    /// Analyze a frame produced by [`Analyzer::frame`].
    pub fn analyze(&self, df: &DataFrame, total_records: usize) -> Result<DatasetAnalysis> {
        let mut analysis = DatasetAnalysis {
            records_analyzed: df.height(),
            records_excluded: total_records.saturating_sub(df.height()),
            ..Default::default()
        };

        if df.height() == 0 {
            warn!("No records passed the cleaning filter; skipping analysis");
            return Ok(analysis);
        }

        for column in DESCRIBED_COLUMNS {
            let values = frame::numeric_values(df, column)?;
            if let Some(stats) = DescriptiveStats::from_values(&values) {
                debug!(
                    "{}: mean={:.2} std={:.2} median={:.2}",
                    column, stats.mean, stats.std, stats.median
                );
                analysis.descriptive.insert(column.to_string(), stats);
            }

            let test = normality::normality_test(
                &values,
                self.min_samples,
                self.max_samples,
                self.seed,
            );
            match (test.statistic, test.p_value) {
                (Some(w), Some(p)) => info!(
                    "Shapiro-Wilk {}: W={:.4} p={:.4} ({})",
                    column,
                    w,
                    p,
                    if test.is_normal { "normal" } else { "not normal" }
                ),
                _ => debug!(
                    "Skipping normality test for {} ({} values)",
                    column, test.sample_size
                ),
            }
            analysis.normality.insert(column.to_string(), test);
        }

        let salaries = frame::numeric_values(df, "base_salary")?;
        analysis.salary_outliers = statistics::iqr_outliers(&salaries).len();
        if analysis.salary_outliers > 0 {
            warn!("Found {} salary outliers", analysis.salary_outliers);
        }

        analysis.mean_salary_by_gender = statistics::group_means(df, "gender", "base_salary")?;
        analysis.mean_salary_by_department =
            statistics::group_means(df, "department", "base_salary")?;

        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn analyzer() -> Analyzer {
        let as_of = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        Analyzer::new(&AuditConfig::default(), CheckContext::new(as_of))
    }

    fn record(row: usize) -> EmployeeRecord {
        EmployeeRecord {
            row,
            employee_id: Some(format!("EMP{:09}", row)),
            base_salary: Some(40_000.0 + 1_000.0 * row as f64),
            hire_date: NaiveDate::from_ymd_opt(2019, 3, 1),
            performance_score: Some(50.0 + (row % 40) as f64),
            birth_date: NaiveDate::from_ymd_opt(1985, 1, 1),
            vacation_days: Some((row % 25) as f64),
            gender: Some(if row % 2 == 0 { "F" } else { "M" }.to_string()),
            department: Some(if row % 3 == 0 { "Sales" } else { "IT" }.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_analyze_excludes_invalid_records() {
        let mut records: Vec<EmployeeRecord> = (0..10).map(record).collect();
        records.push(EmployeeRecord { base_salary: Some(-1.0), ..record(10) });
        records.push(EmployeeRecord { birth_date: NaiveDate::from_ymd_opt(2012, 1, 1), ..record(11) });

        let analyzer = analyzer();
        let df = analyzer.frame(&records).unwrap();
        let analysis = analyzer.analyze(&df, records.len()).unwrap();

        assert_eq!(analysis.records_analyzed, 10);
        assert_eq!(analysis.records_excluded, 2);
        assert!(analysis.stats("base_salary").unwrap().min >= 0.0);
        assert_eq!(analysis.stats("base_salary").unwrap().count, 10);
    }

    #[test]
    fn test_analyze_group_means() {
        let records: Vec<EmployeeRecord> = (0..4).map(record).collect();
        let analyzer = analyzer();
        let df = analyzer.frame(&records).unwrap();
        let analysis = analyzer.analyze(&df, records.len()).unwrap();

        // F: rows 0, 2 -> 40k, 42k; M: rows 1, 3 -> 41k, 43k
        let genders: Vec<(&str, f64)> = analysis
            .mean_salary_by_gender
            .iter()
            .map(|g| (g.label.as_str(), g.mean))
            .collect();
        assert_eq!(genders, vec![("F", 41_000.0), ("M", 42_000.0)]);
        assert_eq!(analysis.mean_salary_by_department.len(), 2);
    }

    #[test]
    fn test_normality_runs_only_on_large_columns() {
        let analyzer = analyzer();

        let small: Vec<EmployeeRecord> = (0..20).map(record).collect();
        let df = analyzer.frame(&small).unwrap();
        let analysis = analyzer.analyze(&df, small.len()).unwrap();
        assert!(!analysis.normality["base_salary"].was_run());

        let large: Vec<EmployeeRecord> = (0..80).map(record).collect();
        let df = analyzer.frame(&large).unwrap();
        let analysis = analyzer.analyze(&df, large.len()).unwrap();
        assert!(analysis.normality["base_salary"].was_run());
    }

    #[test]
    fn test_analyze_empty_frame() {
        let analyzer = analyzer();
        let df = analyzer.frame(&[]).unwrap();
        let analysis = analyzer.analyze(&df, 3).unwrap();
        assert_eq!(analysis.records_analyzed, 0);
        assert_eq!(analysis.records_excluded, 3);
        assert!(analysis.descriptive.is_empty());
    }
}
