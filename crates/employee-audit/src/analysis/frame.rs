//! Builds the typed polars frame that statistics and charts read from.

use crate::types::EmployeeRecord;
use crate::validator::CheckContext;
use anyhow::Result;
use polars::prelude::*;

/// Text columns carried into the analysis frame.
pub const ANALYSIS_CATEGORIES: [&str; 9] = [
    "gender",
    "department",
    "education",
    "city",
    "state",
    "employee_level",
    "work_location",
    "shift",
    "status",
];

/// Whether a record is valid enough to feed descriptive statistics.
///
/// Requires a non-negative salary, a hire date, an in-range performance
/// score and a birth date that is not in the future and gives an age of at
/// least the minimum.
pub fn is_analyzable(record: &EmployeeRecord, ctx: &CheckContext) -> bool {
    let salary_ok = record.base_salary.is_some_and(|s| s >= 0.0);
    let hired = record.hire_date.is_some();
    let score_ok = record
        .performance_score
        .is_some_and(|p| (ctx.performance_min..=ctx.performance_max).contains(&p));
    let age_ok = record.age_at(ctx.as_of).is_some_and(|age| age >= ctx.minimum_age);

    salary_ok && hired && score_ok && age_ok
}

/// Frame of analyzable records: one row per employee, with `age`,
/// numeric measures and the categorical columns.
pub fn build_analysis_frame(records: &[EmployeeRecord], ctx: &CheckContext) -> Result<DataFrame> {
    let kept: Vec<&EmployeeRecord> = records.iter().filter(|r| is_analyzable(r, ctx)).collect();

    let text = |get: fn(&EmployeeRecord) -> &Option<String>| -> Vec<Option<String>> {
        kept.iter().map(|r| get(r).clone()).collect()
    };

    let df = df![
        "employee_id" => text(|r| &r.employee_id),
        "age" => kept.iter().map(|r| r.age_at(ctx.as_of).map(i64::from)).collect::<Vec<_>>(),
        "base_salary" => kept.iter().map(|r| r.base_salary).collect::<Vec<_>>(),
        "performance_score" => kept.iter().map(|r| r.performance_score).collect::<Vec<_>>(),
        "vacation_days" => kept.iter().map(|r| r.vacation_days).collect::<Vec<_>>(),
        "days_service" => kept.iter().map(|r| r.days_service).collect::<Vec<_>>(),
        "gender" => text(|r| &r.gender),
        "department" => text(|r| &r.department),
        "education" => text(|r| &r.education),
        "city" => text(|r| &r.city),
        "state" => text(|r| &r.state),
        "employee_level" => text(|r| &r.employee_level),
        "work_location" => text(|r| &r.work_location),
        "shift" => text(|r| &r.shift),
        "status" => text(|r| &r.status),
    ]?;

    Ok(df)
}

/// Non-null values of a numeric column as `f64`.
pub fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let series = df
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let values = series.f64()?.into_iter().flatten().collect();
    Ok(values)
}

/// Rows where `x`, `y` and `group` are all present.
pub fn grouped_points(
    df: &DataFrame,
    x: &str,
    y: &str,
    group: &str,
) -> Result<Vec<(f64, f64, String)>> {
    let xs = df.column(x)?.as_materialized_series().cast(&DataType::Float64)?;
    let ys = df.column(y)?.as_materialized_series().cast(&DataType::Float64)?;
    let groups = df.column(group)?.as_materialized_series().cast(&DataType::String)?;

    let points = xs
        .f64()?
        .into_iter()
        .zip(ys.f64()?.into_iter())
        .zip(groups.str()?.into_iter())
        .filter_map(|((x, y), g)| Some((x?, y?, g?.to_string())))
        .collect();
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx() -> CheckContext {
        CheckContext::new(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap())
    }

    fn valid(row: usize) -> EmployeeRecord {
        EmployeeRecord {
            row,
            employee_id: Some(format!("EMP{:09}", row)),
            base_salary: Some(50_000.0 + row as f64),
            hire_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            performance_score: Some(70.0),
            birth_date: NaiveDate::from_ymd_opt(1980, 6, 15),
            gender: Some(if row % 2 == 0 { "F" } else { "M" }.to_string()),
            vacation_days: Some(20.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_analyzable_filters_invalid_rows() {
        let ctx = ctx();
        assert!(is_analyzable(&valid(1), &ctx));

        let negative = EmployeeRecord { base_salary: Some(-1.0), ..valid(2) };
        let no_hire = EmployeeRecord { hire_date: None, ..valid(3) };
        let bad_score = EmployeeRecord { performance_score: Some(101.0), ..valid(4) };
        let minor = EmployeeRecord { birth_date: NaiveDate::from_ymd_opt(2010, 1, 1), ..valid(5) };
        let unborn = EmployeeRecord { birth_date: NaiveDate::from_ymd_opt(2030, 1, 1), ..valid(6) };
        let no_score = EmployeeRecord { performance_score: None, ..valid(7) };

        for record in [negative, no_hire, bad_score, minor, unborn, no_score] {
            assert!(!is_analyzable(&record, &ctx), "row {} should be excluded", record.row);
        }
    }

    #[test]
    fn test_build_analysis_frame() {
        let records = vec![
            valid(1),
            valid(2),
            EmployeeRecord { base_salary: Some(-5.0), ..valid(3) },
        ];
        let df = build_analysis_frame(&records, &ctx()).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(numeric_values(&df, "age").unwrap(), vec![44.0, 44.0]);
        assert_eq!(
            numeric_values(&df, "base_salary").unwrap(),
            vec![50_001.0, 50_002.0]
        );
    }

    #[test]
    fn test_grouped_points_skip_missing() {
        let records = vec![
            valid(1),
            EmployeeRecord { vacation_days: None, ..valid(2) },
            EmployeeRecord { gender: None, ..valid(4) },
        ];
        let df = build_analysis_frame(&records, &ctx()).unwrap();
        let points = grouped_points(&df, "base_salary", "vacation_days", "gender").unwrap();
        assert_eq!(points, vec![(50_001.0, 20.0, "M".to_string())]);
    }

    #[test]
    fn test_empty_frame_has_schema() {
        let df = build_analysis_frame(&[], &ctx()).unwrap();
        assert_eq!(df.height(), 0);
        assert!(numeric_values(&df, "base_salary").unwrap().is_empty());
    }
}
