//! Configuration types for the employee audit pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic audit setup.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for an audit run.
///
/// Use [`AuditConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use employee_audit::config::AuditConfig;
/// use chrono::NaiveDate;
///
/// let config = AuditConfig::builder()
///     .as_of(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap())
///     .days_service_tolerance(30)
///     .render_charts(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Reference date for future-date, age and tenure checks.
    /// Default: None (today's local date)
    pub as_of: Option<NaiveDate>,

    /// Allowed absolute difference, in days, between the stored
    /// `days_service` and the days elapsed since `hire_date`.
    /// Default: 30
    pub days_service_tolerance: i64,

    /// Minimum employee age in full years.
    /// Default: 18
    pub minimum_age: u32,

    /// Lowest valid performance score (inclusive).
    /// Default: 0.0
    pub performance_min: f64,

    /// Highest valid performance score (inclusive).
    /// Default: 100.0
    pub performance_max: f64,

    /// Number of offending ids shown per check in the console report.
    /// Default: 5
    pub sample_size: usize,

    /// Fail the load when required columns are missing instead of
    /// excluding them from the checks.
    /// Default: false
    pub strict_columns: bool,

    /// Directory for chart files and the JSON report.
    /// Default: "./plots"
    pub output_dir: PathBuf,

    /// Whether to render chart files.
    /// Default: true
    pub render_charts: bool,

    /// Number of bins in the salary and performance histograms.
    /// Default: 50
    pub histogram_bins: usize,

    /// Number of cities shown in the city distribution chart.
    /// Default: 10
    pub top_cities: usize,

    /// Minimum number of values required to run a normality test.
    /// Default: 50
    pub normality_min_samples: usize,

    /// Maximum number of values sampled for a normality test.
    /// Default: 5000
    pub normality_max_samples: usize,

    /// Seed for the normality sampling RNG, so repeated runs agree.
    /// Default: 42
    pub normality_seed: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            as_of: None,
            days_service_tolerance: 30,
            minimum_age: 18,
            performance_min: 0.0,
            performance_max: 100.0,
            sample_size: 5,
            strict_columns: false,
            output_dir: PathBuf::from("./plots"),
            render_charts: true,
            histogram_bins: 50,
            top_cities: 10,
            normality_min_samples: 50,
            normality_max_samples: 5000,
            normality_seed: 42,
        }
    }
}

impl AuditConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults. The result is validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: AuditConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| crate::error::AuditError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// The reference date for this run.
    pub fn effective_as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.days_service_tolerance < 0 {
            return Err(ConfigValidationError::NegativeTolerance(
                self.days_service_tolerance,
            ));
        }

        if !self.performance_min.is_finite()
            || !self.performance_max.is_finite()
            || self.performance_min > self.performance_max
        {
            return Err(ConfigValidationError::InvalidScoreRange {
                min: self.performance_min,
                max: self.performance_max,
            });
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::ZeroValue("histogram_bins".to_string()));
        }

        if self.top_cities == 0 {
            return Err(ConfigValidationError::ZeroValue("top_cities".to_string()));
        }

        // Shapiro-Wilk p-values are defined for 3..=5000 observations.
        if self.normality_min_samples < 3
            || self.normality_max_samples > 5000
            || self.normality_min_samples > self.normality_max_samples
        {
            return Err(ConfigValidationError::InvalidSampleBounds {
                min: self.normality_min_samples,
                max: self.normality_max_samples,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid days_service tolerance: {0} (must not be negative)")]
    NegativeTolerance(i64),

    #[error("Invalid performance score range: {min}..={max}")]
    InvalidScoreRange { min: f64, max: f64 },

    #[error("'{0}' must be at least 1")]
    ZeroValue(String),

    #[error("Invalid normality sample bounds: min {min}, max {max} (need 3 <= min <= max <= 5000)")]
    InvalidSampleBounds { min: usize, max: usize },
}

/// Builder for [`AuditConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AuditConfigBuilder {
    base: Option<AuditConfig>,
    as_of: Option<NaiveDate>,
    days_service_tolerance: Option<i64>,
    minimum_age: Option<u32>,
    performance_range: Option<(f64, f64)>,
    sample_size: Option<usize>,
    strict_columns: Option<bool>,
    output_dir: Option<PathBuf>,
    render_charts: Option<bool>,
    histogram_bins: Option<usize>,
    top_cities: Option<usize>,
    normality_samples: Option<(usize, usize)>,
    normality_seed: Option<u64>,
}

impl AuditConfigBuilder {
    /// Start from an existing configuration (e.g. one loaded from a file)
    /// instead of the defaults. Values set on the builder still win.
    pub fn base(mut self, config: AuditConfig) -> Self {
        self.base = Some(config);
        self
    }

    /// Set the reference date used by date, age and tenure checks.
    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    /// Set the allowed `days_service` drift in days.
    pub fn days_service_tolerance(mut self, days: i64) -> Self {
        self.days_service_tolerance = Some(days);
        self
    }

    /// Set the minimum employee age in full years.
    pub fn minimum_age(mut self, years: u32) -> Self {
        self.minimum_age = Some(years);
        self
    }

    /// Set the inclusive valid range for performance scores.
    pub fn performance_range(mut self, min: f64, max: f64) -> Self {
        self.performance_range = Some((min, max));
        self
    }

    /// Set how many offending ids the console report shows per check.
    pub fn sample_size(mut self, size: usize) -> Self {
        self.sample_size = Some(size);
        self
    }

    /// Make missing required columns fatal.
    pub fn strict_columns(mut self, strict: bool) -> Self {
        self.strict_columns = Some(strict);
        self
    }

    /// Set the output directory for charts and reports.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Enable or disable chart rendering.
    pub fn render_charts(mut self, render: bool) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// Set the histogram bin count.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set how many cities the city chart shows.
    pub fn top_cities(mut self, count: usize) -> Self {
        self.top_cities = Some(count);
        self
    }

    /// Set the minimum and maximum sample sizes for normality tests.
    pub fn normality_samples(mut self, min: usize, max: usize) -> Self {
        self.normality_samples = Some((min, max));
        self
    }

    /// Set the seed for normality sampling.
    pub fn normality_seed(mut self, seed: u64) -> Self {
        self.normality_seed = Some(seed);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AuditConfig` or an error if validation fails.
    pub fn build(self) -> Result<AuditConfig, ConfigValidationError> {
        let base = self.base.unwrap_or_default();
        let (performance_min, performance_max) = self
            .performance_range
            .unwrap_or((base.performance_min, base.performance_max));
        let (normality_min_samples, normality_max_samples) = self
            .normality_samples
            .unwrap_or((base.normality_min_samples, base.normality_max_samples));

        let config = AuditConfig {
            as_of: self.as_of.or(base.as_of),
            days_service_tolerance: self
                .days_service_tolerance
                .unwrap_or(base.days_service_tolerance),
            minimum_age: self.minimum_age.unwrap_or(base.minimum_age),
            performance_min,
            performance_max,
            sample_size: self.sample_size.unwrap_or(base.sample_size),
            strict_columns: self.strict_columns.unwrap_or(base.strict_columns),
            output_dir: self.output_dir.unwrap_or(base.output_dir),
            render_charts: self.render_charts.unwrap_or(base.render_charts),
            histogram_bins: self.histogram_bins.unwrap_or(base.histogram_bins),
            top_cities: self.top_cities.unwrap_or(base.top_cities),
            normality_min_samples,
            normality_max_samples,
            normality_seed: self.normality_seed.unwrap_or(base.normality_seed),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuditConfig::default();
        assert_eq!(config.days_service_tolerance, 30);
        assert_eq!(config.minimum_age, 18);
        assert_eq!(config.performance_min, 0.0);
        assert_eq!(config.performance_max, 100.0);
        assert_eq!(config.sample_size, 5);
        assert!(config.render_charts);
        assert!(!config.strict_columns);
        assert!(config.as_of.is_none());
    }

    #[test]
    fn test_builder_custom_values() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let config = AuditConfig::builder()
            .as_of(date)
            .days_service_tolerance(10)
            .minimum_age(21)
            .performance_range(1.0, 5.0)
            .render_charts(false)
            .build()
            .unwrap();

        assert_eq!(config.effective_as_of(), date);
        assert_eq!(config.days_service_tolerance, 10);
        assert_eq!(config.minimum_age, 21);
        assert_eq!(config.performance_max, 5.0);
        assert!(!config.render_charts);
    }

    #[test]
    fn test_builder_overrides_base() {
        let base = AuditConfig {
            minimum_age: 16,
            sample_size: 20,
            ..AuditConfig::default()
        };
        let config = AuditConfig::builder()
            .base(base)
            .sample_size(3)
            .build()
            .unwrap();

        assert_eq!(config.minimum_age, 16);
        assert_eq!(config.sample_size, 3);
    }

    #[test]
    fn test_validation_negative_tolerance() {
        let result = AuditConfig::builder().days_service_tolerance(-1).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::NegativeTolerance(-1)
        ));
    }

    #[test]
    fn test_validation_inverted_score_range() {
        let result = AuditConfig::builder().performance_range(100.0, 0.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidScoreRange { .. }
        ));
    }

    #[test]
    fn test_validation_sample_bounds() {
        assert!(AuditConfig::builder().normality_samples(2, 100).build().is_err());
        assert!(AuditConfig::builder().normality_samples(60, 50).build().is_err());
        assert!(AuditConfig::builder().histogram_bins(0).build().is_err());
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{
            "as_of": "2025-05-01",
            "days_service_tolerance": 45,
            "output_dir": "custom_plots"
        }"#;

        let config: AuditConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.as_of, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(config.days_service_tolerance, 45);
        assert_eq!(config.output_dir, PathBuf::from("custom_plots"));
        assert_eq!(config.minimum_age, 18);
        assert_eq!(config.histogram_bins, 50);
    }

    #[test]
    fn test_config_from_json_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.json");
        std::fs::write(&path, r#"{ "top_cities": 0 }"#).unwrap();

        let error = AuditConfig::from_json_file(&path).unwrap_err();
        assert_eq!(error.error_code(), "INVALID_CONFIG");
    }
}
