use crate::config::AuditConfig;
use crate::error::{AuditError, Result, ResultExt};
use crate::types::{
    EmployeeDataset, EmployeeRecord, FieldKind, ParseIssue, REQUIRED_COLUMNS,
};
use crate::utils::{is_missing_marker, normalize_text, parse_date_string, parse_numeric_string};
use chrono::NaiveDate;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Loads employee CSV files into an [`EmployeeDataset`].
#[derive(Debug, Clone, Default)]
pub struct EmployeeLoader {
    strict_columns: bool,
}

impl EmployeeLoader {
    /// Create a loader. With `strict_columns`, a missing required column
    /// fails the load with [`AuditError::MissingColumns`].
    pub fn new(strict_columns: bool) -> Self {
        Self { strict_columns }
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        Self::new(config.strict_columns)
    }

    /// Read a CSV file. The header row is required; all columns are read as text.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<EmployeeDataset> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AuditError::InputNotFound(path.to_path_buf()));
        }

        info!("Loading employee records from: {}", path.display());
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .context("Opening CSV reader")?
            .finish()
            .context(format!("Reading {}", path.display()))?;
        debug!("Raw frame shape: {:?}", df.shape());

        let mut dataset = self.load_frame(&df)?;
        dataset.source = Some(path.to_path_buf());
        Ok(dataset)
    }

    /// Convert a frame of raw cells into typed records.
    ///
    /// Non-string columns are cast to text first, so a frame built in memory
    /// goes through the same parsing as a file.
    pub fn load_frame(&self, df: &DataFrame) -> Result<EmployeeDataset> {
        let mut columns: HashMap<&'static str, StringChunked> = HashMap::new();
        let mut missing_columns = Vec::new();

        for name in REQUIRED_COLUMNS {
            match df.column(name) {
                Ok(column) => {
                    let as_text = column
                        .as_materialized_series()
                        .cast(&DataType::String)
                        .context(format!("Casting column '{}' to text", name))?;
                    columns.insert(name, as_text.str()?.clone());
                }
                Err(_) => missing_columns.push(name.to_string()),
            }
        }

        if !missing_columns.is_empty() {
            if self.strict_columns {
                return Err(AuditError::MissingColumns(missing_columns));
            }
            warn!(
                "Missing required columns (excluded from checks): {}",
                missing_columns.join(", ")
            );
        }

        let mut parse_issues = Vec::new();
        let records: Vec<EmployeeRecord> = (0..df.height())
            .map(|row| RowParser::new(row, &columns, &mut parse_issues).parse())
            .collect();

        if !parse_issues.is_empty() {
            warn!(
                "Found {} unparsable cells; affected values are excluded from checks",
                parse_issues.len()
            );
            for issue in parse_issues.iter().take(5) {
                debug!(
                    "row {} column '{}': {:?} is not a valid {:?}",
                    issue.row, issue.column, issue.raw_value, issue.expected
                );
            }
        }

        let dataset = EmployeeDataset {
            source: None,
            records,
            parse_issues,
            missing_columns,
        };

        let missing: Vec<String> = dataset
            .missing_value_counts()
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(column, count)| format!("{}={}", column, count))
            .collect();
        if !missing.is_empty() {
            info!("Missing values: {}", missing.join(", "));
        }

        info!("Loaded {} employee records", dataset.len());
        Ok(dataset)
    }
}

/// Parses the cells of one row, pushing issues for values that do not parse.
struct RowParser<'a> {
    row: usize,
    columns: &'a HashMap<&'static str, StringChunked>,
    issues: &'a mut Vec<ParseIssue>,
    employee_id: Option<String>,
}

impl<'a> RowParser<'a> {
    fn new(
        row: usize,
        columns: &'a HashMap<&'static str, StringChunked>,
        issues: &'a mut Vec<ParseIssue>,
    ) -> Self {
        let mut parser = Self {
            row,
            columns,
            issues,
            employee_id: None,
        };
        parser.employee_id = parser.text("employee_id");
        parser
    }

    fn raw(&self, column: &str) -> Option<&'a str> {
        self.columns.get(column).and_then(|ca| ca.get(self.row))
    }

    fn text(&self, column: &str) -> Option<String> {
        self.raw(column).and_then(normalize_text)
    }

    fn number(&mut self, column: &str) -> Option<f64> {
        let raw = self.raw(column)?;
        if is_missing_marker(raw) {
            return None;
        }
        let parsed = parse_numeric_string(raw);
        if parsed.is_none() {
            self.record_issue(column, raw, FieldKind::Number);
        }
        parsed
    }

    fn date(&mut self, column: &str) -> Option<NaiveDate> {
        let raw = self.raw(column)?;
        if is_missing_marker(raw) {
            return None;
        }
        let parsed = parse_date_string(raw);
        if parsed.is_none() {
            self.record_issue(column, raw, FieldKind::Date);
        }
        parsed
    }

    fn record_issue(&mut self, column: &str, raw: &str, expected: FieldKind) {
        self.issues.push(ParseIssue {
            row: self.row,
            employee_id: self.employee_id.clone(),
            column: column.to_string(),
            raw_value: raw.to_string(),
            expected,
        });
    }

    fn parse(mut self) -> EmployeeRecord {
        EmployeeRecord {
            row: self.row,
            employee_id: self.employee_id.clone(),
            first_name: self.text("first_name"),
            last_name: self.text("last_name"),
            email: self.text("email"),
            phone_number: self.text("phone_number"),
            department: self.text("department"),
            job_title: self.text("job_title"),
            hire_date: self.date("hire_date"),
            days_service: self.number("days_service"),
            base_salary: self.number("base_salary"),
            bonus_percentage: self.number("bonus_percentage"),
            status: self.text("status"),
            birth_date: self.date("birth_date"),
            address: self.text("address"),
            city: self.text("city"),
            state: self.text("state"),
            zip_code: self.text("zip_code"),
            country: self.text("country"),
            gender: self.text("gender"),
            education: self.text("education"),
            performance_score: self.number("performance_score"),
            last_review_date: self.date("last_review_date"),
            employee_level: self.text("employee_level"),
            vacation_days: self.number("vacation_days"),
            sick_days: self.number("sick_days"),
            work_location: self.text("work_location"),
            shift: self.text("shift"),
            emergency_contact: self.text("emergency_contact"),
            ssn: self.text("ssn"),
            bank_account: self.text("bank_account"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn partial_frame() -> DataFrame {
        df![
            "employee_id" => ["EMP000000001", "EMP000000002", " "],
            "hire_date" => ["2021-04-01", "2021-13-01", ""],
            "base_salary" => ["43300.94", "-5000", "lots"],
            "gender" => [" M ", "F", "   "],
        ]
        .unwrap()
    }

    #[test]
    fn test_load_frame_parses_typed_fields() {
        let dataset = EmployeeLoader::new(false).load_frame(&partial_frame()).unwrap();

        assert_eq!(dataset.len(), 3);
        let first = &dataset.records[0];
        assert_eq!(first.row, 0);
        assert_eq!(first.employee_id.as_deref(), Some("EMP000000001"));
        assert_eq!(first.hire_date, NaiveDate::from_ymd_opt(2021, 4, 1));
        assert_eq!(first.base_salary, Some(43300.94));
        assert_eq!(first.gender.as_deref(), Some("M"));
        assert_eq!(dataset.records[1].base_salary, Some(-5000.0));
    }

    #[test]
    fn test_load_frame_records_parse_issues() {
        let dataset = EmployeeLoader::new(false).load_frame(&partial_frame()).unwrap();

        let columns: Vec<&str> = dataset
            .parse_issues
            .iter()
            .map(|issue| issue.column.as_str())
            .collect();
        assert_eq!(columns, vec!["hire_date", "base_salary"]);

        let bad_date = &dataset.parse_issues[0];
        assert_eq!(bad_date.row, 1);
        assert_eq!(bad_date.employee_id.as_deref(), Some("EMP000000002"));
        assert_eq!(bad_date.raw_value, "2021-13-01");
        assert_eq!(bad_date.expected, FieldKind::Date);

        assert_eq!(dataset.records[1].hire_date, None);
        assert_eq!(dataset.records[2].base_salary, None);
    }

    #[test]
    fn test_blank_cells_are_missing_not_malformed() {
        let dataset = EmployeeLoader::new(false).load_frame(&partial_frame()).unwrap();
        let third = &dataset.records[2];
        assert_eq!(third.employee_id, None);
        assert_eq!(third.hire_date, None);
        assert_eq!(third.gender, None);
        let row_two: Vec<&str> = dataset
            .parse_issues
            .iter()
            .filter(|issue| issue.row == 2)
            .map(|issue| issue.column.as_str())
            .collect();
        assert_eq!(row_two, vec!["base_salary"]);
    }

    #[test]
    fn test_missing_columns_are_reported() {
        let dataset = EmployeeLoader::new(false).load_frame(&partial_frame()).unwrap();
        assert_eq!(dataset.missing_columns.len(), REQUIRED_COLUMNS.len() - 4);
        assert!(dataset.missing_columns.contains(&"ssn".to_string()));
        assert!(dataset.records.iter().all(|r| r.ssn.is_none()));
    }

    #[test]
    fn test_strict_columns_fail_on_missing() {
        let error = EmployeeLoader::new(true)
            .load_frame(&partial_frame())
            .unwrap_err();
        assert_eq!(error.error_code(), "MISSING_COLUMNS");
    }

    #[test]
    fn test_numeric_frame_is_cast_to_text() {
        let df = df![
            "employee_id" => ["EMP000000001"],
            "vacation_days" => [19i64],
            "performance_score" => [75.6f64],
        ]
        .unwrap();
        let dataset = EmployeeLoader::new(false).load_frame(&df).unwrap();
        assert_eq!(dataset.records[0].vacation_days, Some(19.0));
        assert_eq!(dataset.records[0].performance_score, Some(75.6));
    }

    #[test]
    fn test_load_path_missing_file() {
        let error = EmployeeLoader::default()
            .load_path("/definitely/not/here.csv")
            .unwrap_err();
        assert!(matches!(error, AuditError::InputNotFound(_)));
    }

    #[test]
    fn test_load_path_reads_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("employees.csv");
        std::fs::write(
            &path,
            "employee_id,hire_date,days_service\nEMP000000001,2021-04-01,1491\nEMP000000002,,\n",
        )
        .unwrap();

        let dataset = EmployeeLoader::default().load_path(&path).unwrap();
        assert_eq!(dataset.source.as_deref(), Some(path.as_path()));
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[0].days_service, Some(1491.0));
        assert_eq!(dataset.records[1].hire_date, None);
        assert!(dataset.parse_issues.is_empty());
    }
}
