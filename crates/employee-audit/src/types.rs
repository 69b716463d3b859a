use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Columns every employee CSV is expected to carry, in file order.
pub const REQUIRED_COLUMNS: [&str; 30] = [
    "employee_id",
    "first_name",
    "last_name",
    "email",
    "phone_number",
    "department",
    "job_title",
    "hire_date",
    "days_service",
    "base_salary",
    "bonus_percentage",
    "status",
    "birth_date",
    "address",
    "city",
    "state",
    "zip_code",
    "country",
    "gender",
    "education",
    "performance_score",
    "last_review_date",
    "employee_level",
    "vacation_days",
    "sick_days",
    "work_location",
    "shift",
    "emergency_contact",
    "ssn",
    "bank_account",
];

/// Categorical columns. Values are trimmed and blank values become missing.
pub const CATEGORICAL_COLUMNS: [&str; 8] = [
    "department",
    "job_title",
    "status",
    "gender",
    "education",
    "employee_level",
    "work_location",
    "shift",
];

/// Date columns, parsed as `YYYY-MM-DD`.
pub const DATE_COLUMNS: [&str; 3] = ["hire_date", "birth_date", "last_review_date"];

/// Numeric columns.
pub const NUMERIC_COLUMNS: [&str; 6] = [
    "days_service",
    "base_salary",
    "bonus_percentage",
    "performance_score",
    "vacation_days",
    "sick_days",
];

/// How a column's raw text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Categorical,
    Date,
    Number,
}

impl FieldKind {
    /// Kind of a known column. Unknown names are treated as free text.
    pub fn of_column(column: &str) -> Self {
        if DATE_COLUMNS.contains(&column) {
            FieldKind::Date
        } else if NUMERIC_COLUMNS.contains(&column) {
            FieldKind::Number
        } else if CATEGORICAL_COLUMNS.contains(&column) {
            FieldKind::Categorical
        } else {
            FieldKind::Text
        }
    }
}

/// One employee row with typed, optional fields.
///
/// A field is `None` when the cell was empty, held an error marker, could
/// not be parsed, or its column was absent from the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Zero-based data row index (the header is not counted).
    pub row: usize,
    pub employee_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub days_service: Option<f64>,
    pub base_salary: Option<f64>,
    pub bonus_percentage: Option<f64>,
    pub status: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub education: Option<String>,
    pub performance_score: Option<f64>,
    pub last_review_date: Option<NaiveDate>,
    pub employee_level: Option<String>,
    pub vacation_days: Option<f64>,
    pub sick_days: Option<f64>,
    pub work_location: Option<String>,
    pub shift: Option<String>,
    pub emergency_contact: Option<String>,
    pub ssn: Option<String>,
    pub bank_account: Option<String>,
}

impl EmployeeRecord {
    /// Identifier of this record for reporting purposes.
    pub fn reference(&self) -> RecordRef {
        RecordRef {
            row: self.row,
            employee_id: self.employee_id.clone(),
        }
    }

    /// Whether the value of `column` is missing. Unknown columns count as missing.
    pub fn is_missing(&self, column: &str) -> bool {
        match column {
            "employee_id" => self.employee_id.is_none(),
            "first_name" => self.first_name.is_none(),
            "last_name" => self.last_name.is_none(),
            "email" => self.email.is_none(),
            "phone_number" => self.phone_number.is_none(),
            "department" => self.department.is_none(),
            "job_title" => self.job_title.is_none(),
            "hire_date" => self.hire_date.is_none(),
            "days_service" => self.days_service.is_none(),
            "base_salary" => self.base_salary.is_none(),
            "bonus_percentage" => self.bonus_percentage.is_none(),
            "status" => self.status.is_none(),
            "birth_date" => self.birth_date.is_none(),
            "address" => self.address.is_none(),
            "city" => self.city.is_none(),
            "state" => self.state.is_none(),
            "zip_code" => self.zip_code.is_none(),
            "country" => self.country.is_none(),
            "gender" => self.gender.is_none(),
            "education" => self.education.is_none(),
            "performance_score" => self.performance_score.is_none(),
            "last_review_date" => self.last_review_date.is_none(),
            "employee_level" => self.employee_level.is_none(),
            "vacation_days" => self.vacation_days.is_none(),
            "sick_days" => self.sick_days.is_none(),
            "work_location" => self.work_location.is_none(),
            "shift" => self.shift.is_none(),
            "emergency_contact" => self.emergency_contact.is_none(),
            "ssn" => self.ssn.is_none(),
            "bank_account" => self.bank_account.is_none(),
            _ => true,
        }
    }

    /// Age in completed years at `as_of`, or `None` if the birth date is
    /// missing or lies after `as_of`.
    pub fn age_at(&self, as_of: NaiveDate) -> Option<u32> {
        self.birth_date.and_then(|birth| as_of.years_since(birth))
    }

    /// Days elapsed between `hire_date` and `as_of`, or `None` if the hire
    /// date is missing or lies after `as_of`.
    pub fn days_since_hire(&self, as_of: NaiveDate) -> Option<i64> {
        self.hire_date
            .filter(|hire| *hire <= as_of)
            .map(|hire| (as_of - hire).num_days())
    }
}

/// Identifies a record in findings: its row and, when present, its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub row: usize,
    pub employee_id: Option<String>,
}

impl RecordRef {
    /// The employee id, or `row <n>` for records without one.
    pub fn label(&self) -> String {
        match &self.employee_id {
            Some(id) => id.clone(),
            None => format!("row {}", self.row),
        }
    }
}

impl std::fmt::Display for RecordRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// A non-empty cell that could not be parsed as its column's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseIssue {
    pub row: usize,
    pub employee_id: Option<String>,
    pub column: String,
    pub raw_value: String,
    pub expected: FieldKind,
}

/// The loaded dataset: typed records plus everything that went wrong
/// reading them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeDataset {
    pub source: Option<PathBuf>,
    pub records: Vec<EmployeeRecord>,
    pub parse_issues: Vec<ParseIssue>,
    /// Required columns absent from the input.
    pub missing_columns: Vec<String>,
}

impl EmployeeDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count of missing values per required column, in column order.
    pub fn missing_value_counts(&self) -> BTreeMap<String, usize> {
        REQUIRED_COLUMNS
            .iter()
            .map(|column| {
                let missing = self.records.iter().filter(|r| r.is_missing(column)).count();
                (column.to_string(), missing)
            })
            .collect()
    }
}
