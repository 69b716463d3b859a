//! Record validation module.
//!
//! Each [`CheckKind`] is a pure rule over the full record set. Checks do not
//! share state, so they can run in any order and a record that trips one
//! rule is still examined by every other rule. Records whose relevant field
//! is missing are skipped by that rule only.

pub mod rules;

use crate::config::AuditConfig;
use crate::types::{EmployeeRecord, RecordRef};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub use rules::EMPLOYEE_ID_PATTERN;

/// The validation rules, one per dataset invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    DuplicateEmployeeId,
    InvalidEmployeeId,
    FutureBirthDate,
    FutureHireDate,
    FutureReviewDate,
    NegativeBaseSalary,
    PerformanceOutOfRange,
    NegativeVacationDays,
    NegativeSickDays,
    NegativeDaysService,
    UnderMinimumAge,
    DaysServiceMismatch,
}

impl CheckKind {
    /// Every check, in report order.
    pub const ALL: [CheckKind; 12] = [
        CheckKind::DuplicateEmployeeId,
        CheckKind::InvalidEmployeeId,
        CheckKind::FutureBirthDate,
        CheckKind::FutureHireDate,
        CheckKind::FutureReviewDate,
        CheckKind::NegativeBaseSalary,
        CheckKind::PerformanceOutOfRange,
        CheckKind::NegativeVacationDays,
        CheckKind::NegativeSickDays,
        CheckKind::NegativeDaysService,
        CheckKind::UnderMinimumAge,
        CheckKind::DaysServiceMismatch,
    ];

    /// Stable snake_case identifier.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateEmployeeId => "duplicate_employee_id",
            Self::InvalidEmployeeId => "invalid_employee_id",
            Self::FutureBirthDate => "future_birth_date",
            Self::FutureHireDate => "future_hire_date",
            Self::FutureReviewDate => "future_review_date",
            Self::NegativeBaseSalary => "negative_base_salary",
            Self::PerformanceOutOfRange => "performance_out_of_range",
            Self::NegativeVacationDays => "negative_vacation_days",
            Self::NegativeSickDays => "negative_sick_days",
            Self::NegativeDaysService => "negative_days_service",
            Self::UnderMinimumAge => "under_minimum_age",
            Self::DaysServiceMismatch => "days_service_mismatch",
        }
    }

    /// Human-readable title used in reports and logs.
    pub fn title(&self) -> &'static str {
        match self {
            Self::DuplicateEmployeeId => "duplicate employee IDs",
            Self::InvalidEmployeeId => "invalid employee IDs",
            Self::FutureBirthDate => "future birth dates",
            Self::FutureHireDate => "future hire dates",
            Self::FutureReviewDate => "future last review dates",
            Self::NegativeBaseSalary => "negative salaries",
            Self::PerformanceOutOfRange => "invalid performance scores",
            Self::NegativeVacationDays => "negative vacation days",
            Self::NegativeSickDays => "negative sick days",
            Self::NegativeDaysService => "negative days_service",
            Self::UnderMinimumAge => "employees under minimum age",
            Self::DaysServiceMismatch => "inconsistent days_service vs hire_date",
        }
    }

    /// The columns this check reads.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::DuplicateEmployeeId | Self::InvalidEmployeeId => &["employee_id"],
            Self::FutureBirthDate | Self::UnderMinimumAge => &["birth_date"],
            Self::FutureHireDate => &["hire_date"],
            Self::FutureReviewDate => &["last_review_date"],
            Self::NegativeBaseSalary => &["base_salary"],
            Self::PerformanceOutOfRange => &["performance_score"],
            Self::NegativeVacationDays => &["vacation_days"],
            Self::NegativeSickDays => &["sick_days"],
            Self::NegativeDaysService => &["days_service"],
            Self::DaysServiceMismatch => &["days_service", "hire_date"],
        }
    }

    /// Look a check up by its code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Parameters shared by all checks for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckContext {
    pub as_of: NaiveDate,
    pub minimum_age: u32,
    pub days_service_tolerance: i64,
    pub performance_min: f64,
    pub performance_max: f64,
}

impl CheckContext {
    /// Context with default thresholds for the given reference date.
    pub fn new(as_of: NaiveDate) -> Self {
        Self::from_config(&AuditConfig::default(), as_of)
    }

    pub fn from_config(config: &AuditConfig, as_of: NaiveDate) -> Self {
        Self {
            as_of,
            minimum_age: config.minimum_age,
            days_service_tolerance: config.days_service_tolerance,
            performance_min: config.performance_min,
            performance_max: config.performance_max,
        }
    }
}

/// One record failing one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub record: RecordRef,
    pub reason: String,
}

/// The result of running one check over the record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check: CheckKind,
    /// Records whose relevant fields were present.
    pub examined: usize,
    /// Records skipped because a relevant field was missing.
    pub skipped: usize,
    pub violations: Vec<Violation>,
}

impl CheckOutcome {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Distinct offending labels (employee id, or `row <n>`), first-seen order.
    pub fn offending_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.violations
            .iter()
            .map(|v| v.record.label())
            .filter(|label| seen.insert(label.clone()))
            .collect()
    }
}

/// Runs a set of checks over employee records.
///
/// # Example
///
/// ```rust,ignore
/// use employee_audit::validator::{CheckContext, Validator};
///
/// let validator = Validator::new(CheckContext::new(as_of));
/// for outcome in validator.run(&dataset.records) {
///     println!("{}: {}", outcome.check.title(), outcome.violation_count());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    context: CheckContext,
    checks: Vec<CheckKind>,
}

impl Validator {
    /// A validator running every check.
    pub fn new(context: CheckContext) -> Self {
        Self {
            context,
            checks: CheckKind::ALL.to_vec(),
        }
    }

    /// Restrict the validator to a subset of checks.
    pub fn with_checks(mut self, checks: impl IntoIterator<Item = CheckKind>) -> Self {
        self.checks = checks.into_iter().collect();
        self
    }

    pub fn context(&self) -> &CheckContext {
        &self.context
    }

    pub fn checks(&self) -> &[CheckKind] {
        &self.checks
    }

    /// Run every configured check.
    pub fn run(&self, records: &[EmployeeRecord]) -> Vec<CheckOutcome> {
        info!(
            "Running {} checks over {} records (as of {})",
            self.checks.len(),
            records.len(),
            self.context.as_of
        );
        self.checks
            .iter()
            .map(|kind| self.run_check(*kind, records))
            .collect()
    }

    /// Run a single check.
    pub fn run_check(&self, kind: CheckKind, records: &[EmployeeRecord]) -> CheckOutcome {
        let outcome = rules::evaluate(kind, records, &self.context);

        if outcome.is_clean() {
            debug!("{}: no findings ({} examined)", kind.code(), outcome.examined);
        } else {
            let sample: Vec<String> = outcome.offending_ids().into_iter().take(5).collect();
            warn!(
                "Found {} {}: {}",
                outcome.violation_count(),
                kind.title(),
                sample.join(", ")
            );
        }

        outcome
    }
}
