//! Rule functions behind each [`CheckKind`].
//!
//! Every function takes the whole record set and returns a [`CheckOutcome`].
//! None of them mutate or depend on anything but their arguments.

use super::{CheckContext, CheckKind, CheckOutcome, Violation};
use crate::types::EmployeeRecord;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Valid employee ids: `EMP` followed by exactly nine ASCII digits.
pub static EMPLOYEE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^EMP[0-9]{9}$").expect("Invalid regex: employee id"));

/// Dispatch a check to its rule.
pub fn evaluate(kind: CheckKind, records: &[EmployeeRecord], ctx: &CheckContext) -> CheckOutcome {
    match kind {
        CheckKind::DuplicateEmployeeId => duplicate_employee_ids(records),
        CheckKind::InvalidEmployeeId => invalid_employee_ids(records),
        CheckKind::FutureBirthDate => {
            future_dates(kind, records, ctx.as_of, "birth_date", |r| r.birth_date)
        }
        CheckKind::FutureHireDate => {
            future_dates(kind, records, ctx.as_of, "hire_date", |r| r.hire_date)
        }
        CheckKind::FutureReviewDate => future_dates(kind, records, ctx.as_of, "last_review_date", |r| {
            r.last_review_date
        }),
        CheckKind::NegativeBaseSalary => {
            negative_values(kind, records, "base_salary", |r| r.base_salary)
        }
        CheckKind::PerformanceOutOfRange => performance_out_of_range(records, ctx),
        CheckKind::NegativeVacationDays => {
            negative_values(kind, records, "vacation_days", |r| r.vacation_days)
        }
        CheckKind::NegativeSickDays => {
            negative_values(kind, records, "sick_days", |r| r.sick_days)
        }
        CheckKind::NegativeDaysService => {
            negative_values(kind, records, "days_service", |r| r.days_service)
        }
        CheckKind::UnderMinimumAge => under_minimum_age(records, ctx),
        CheckKind::DaysServiceMismatch => days_service_mismatch(records, ctx),
    }
}

/// Apply `verdict` to every record where `field` yields a value.
fn scan<'a, T>(
    kind: CheckKind,
    records: &'a [EmployeeRecord],
    field: impl Fn(&'a EmployeeRecord) -> Option<T>,
    verdict: impl Fn(&T) -> Option<String>,
) -> CheckOutcome {
    let mut examined = 0;
    let mut violations = Vec::new();

    for record in records {
        let Some(value) = field(record) else {
            continue;
        };
        examined += 1;
        if let Some(reason) = verdict(&value) {
            violations.push(Violation {
                record: record.reference(),
                reason,
            });
        }
    }

    CheckOutcome {
        check: kind,
        examined,
        skipped: records.len() - examined,
        violations,
    }
}

/// Every row whose id occurs more than once (all occurrences are flagged).
pub fn duplicate_employee_ids(records: &[EmployeeRecord]) -> CheckOutcome {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for id in records.iter().filter_map(|r| r.employee_id.as_deref()) {
        *counts.entry(id).or_insert(0) += 1;
    }

    scan(
        CheckKind::DuplicateEmployeeId,
        records,
        |r| r.employee_id.as_deref(),
        |id| {
            let occurrences = counts.get(id).copied().unwrap_or(0);
            (occurrences > 1)
                .then(|| format!("employee_id {} appears {} times", id, occurrences))
        },
    )
}

/// Ids that are not `EMP` plus nine digits.
pub fn invalid_employee_ids(records: &[EmployeeRecord]) -> CheckOutcome {
    scan(
        CheckKind::InvalidEmployeeId,
        records,
        |r| r.employee_id.as_deref(),
        |id| {
            (!EMPLOYEE_ID_PATTERN.is_match(id))
                .then(|| format!("employee_id '{}' is not EMP followed by 9 digits", id))
        },
    )
}

/// Dates strictly after the reference date.
pub fn future_dates(
    kind: CheckKind,
    records: &[EmployeeRecord],
    as_of: NaiveDate,
    column: &str,
    field: impl Fn(&EmployeeRecord) -> Option<NaiveDate>,
) -> CheckOutcome {
    scan(kind, records, field, |date| {
        (*date > as_of).then(|| format!("{} {} is after {}", column, date, as_of))
    })
}

/// Values strictly below zero.
pub fn negative_values(
    kind: CheckKind,
    records: &[EmployeeRecord],
    column: &str,
    field: impl Fn(&EmployeeRecord) -> Option<f64>,
) -> CheckOutcome {
    scan(kind, records, field, |value| {
        (*value < 0.0).then(|| format!("{} is negative ({})", column, value))
    })
}

/// Scores outside the inclusive configured range.
pub fn performance_out_of_range(records: &[EmployeeRecord], ctx: &CheckContext) -> CheckOutcome {
    let range = ctx.performance_min..=ctx.performance_max;
    scan(
        CheckKind::PerformanceOutOfRange,
        records,
        |r| r.performance_score,
        |score| {
            (!range.contains(score)).then(|| {
                format!(
                    "performance_score {} is outside [{}, {}]",
                    score, ctx.performance_min, ctx.performance_max
                )
            })
        },
    )
}

/// Employees younger than the minimum age in completed years.
///
/// Birth dates after the reference date are skipped; they are reported by
/// the future birth date check.
pub fn under_minimum_age(records: &[EmployeeRecord], ctx: &CheckContext) -> CheckOutcome {
    scan(
        CheckKind::UnderMinimumAge,
        records,
        |r| r.birth_date.zip(r.age_at(ctx.as_of)),
        |(birth, age)| {
            (*age < ctx.minimum_age).then(|| {
                format!(
                    "age {} is below {} (birth_date {})",
                    age, ctx.minimum_age, birth
                )
            })
        },
    )
}

/// Stored `days_service` further than the tolerance from the days elapsed
/// since `hire_date`. A difference equal to the tolerance passes.
pub fn days_service_mismatch(records: &[EmployeeRecord], ctx: &CheckContext) -> CheckOutcome {
    scan(
        CheckKind::DaysServiceMismatch,
        records,
        |r| r.days_service.zip(r.days_since_hire(ctx.as_of)),
        |(stored, elapsed)| {
            let drift = (stored - *elapsed as f64).abs();
            (drift > ctx.days_service_tolerance as f64).then(|| {
                format!(
                    "days_service {} differs from {} days since hire by {} (tolerance {})",
                    stored, elapsed, drift, ctx.days_service_tolerance
                )
            })
        },
    )
}
