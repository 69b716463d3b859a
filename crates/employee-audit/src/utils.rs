//! Shared utilities for the employee audit pipeline.
//!
//! Cell-level parsing used by the loader, plus small numeric helpers
//! shared by the analysis and chart modules.

use chrono::{NaiveDate, NaiveDateTime};

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Common error/missing value markers in data.
pub const ERROR_MARKERS: [&str; 10] = [
    "error", "unknown", "n/a", "na", "nan", "null", "missing", "none", "#n/a", "nat",
];

/// Date format used by the employee files.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Clean a string for numeric parsing by removing formatting characters.
///
/// # Example
///
/// ```rust,ignore
/// use employee_audit::utils::clean_numeric_string;
///
/// assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
/// assert_eq!(clean_numeric_string("  42%  "), "42");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Check if a string is an error/missing value marker.
pub fn is_error_marker(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    ERROR_MARKERS.iter().any(|&marker| lower == marker)
}

/// Whether a raw numeric or date cell should be read as missing.
pub fn is_missing_marker(s: &str) -> bool {
    let trimmed = s.trim();
    trimmed.is_empty() || is_error_marker(trimmed)
}

/// Try to parse a string as a numeric value (f64).
///
/// Handles common formatting like currency symbols, percentages, and thousands separators.
/// Non-finite results (`inf`, `NaN`) are rejected.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Try to parse a `YYYY-MM-DD` date. A trailing time component
/// (`T12:00:00` or ` 12:00:00`) is accepted and dropped.
pub fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Some(date);
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.date())
}

/// Trim a text cell; blank cells become `None`.
pub fn normalize_text(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// Numeric Utilities
// =============================================================================

/// Quantile of already sorted values using linear interpolation between
/// closest ranks. Returns `None` for empty input.
pub fn sorted_quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Sort a copy of `values` ascending, ignoring NaN ordering issues.
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== numeric parsing tests ====================

    #[test]
    fn test_clean_numeric_string() {
        assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
        assert_eq!(clean_numeric_string("  42%  "), "42");
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("43300.94"), Some(43300.94));
        assert_eq!(parse_numeric_string("-5000"), Some(-5000.0));
        assert_eq!(parse_numeric_string("$1,000"), Some(1000.0));
        assert_eq!(parse_numeric_string("abc"), None);
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("inf"), None);
    }

    #[test]
    fn test_missing_markers() {
        assert!(is_missing_marker(""));
        assert!(is_missing_marker("   "));
        assert!(is_missing_marker("NaN"));
        assert!(is_missing_marker("N/A"));
        assert!(!is_missing_marker("0"));
        assert!(!is_missing_marker("2021-04-01"));
    }

    // ==================== date parsing tests ====================

    #[test]
    fn test_parse_date_string() {
        assert_eq!(
            parse_date_string("2021-04-01"),
            NaiveDate::from_ymd_opt(2021, 4, 1)
        );
        assert_eq!(
            parse_date_string(" 2021-04-01 00:00:00 "),
            NaiveDate::from_ymd_opt(2021, 4, 1)
        );
        assert_eq!(
            parse_date_string("2021-04-01T08:30:00"),
            NaiveDate::from_ymd_opt(2021, 4, 1)
        );
        assert_eq!(parse_date_string("2021-02-30"), None);
        assert_eq!(parse_date_string("01/04/2021"), None);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Marketing "), Some("Marketing".to_string()));
        assert_eq!(normalize_text("   "), None);
    }

    // ==================== quantile tests ====================

    #[test]
    fn test_sorted_quantile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(sorted_quantile(&values, 0.0), Some(1.0));
        assert_eq!(sorted_quantile(&values, 0.5), Some(2.5));
        assert_eq!(sorted_quantile(&values, 0.25), Some(1.75));
        assert_eq!(sorted_quantile(&values, 1.0), Some(4.0));
        assert_eq!(sorted_quantile(&[], 0.5), None);
    }

    #[test]
    fn test_sorted_copy() {
        assert_eq!(sorted_copy(&[3.0, 1.0, 2.0]), vec![1.0, 2.0, 3.0]);
    }
}
