//! Shapiro-Wilk normality testing of analysis columns.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Significance level below which a sample is considered non-normal.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Shapiro-Wilk is undefined below three observations.
const MIN_TESTABLE_SAMPLES: usize = 3;

/// Outcome of a normality test on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalityTest {
    /// Number of values the test ran on (after sampling).
    pub sample_size: usize,
    /// The W statistic, `None` when the test was skipped.
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
    pub is_normal: bool,
}

impl NormalityTest {
    fn skipped(sample_size: usize) -> Self {
        Self {
            sample_size,
            statistic: None,
            p_value: None,
            is_normal: false,
        }
    }

    pub fn was_run(&self) -> bool {
        self.statistic.is_some()
    }
}

/// Test `values` for normality.
///
/// Columns with fewer than `min_samples` values are skipped. Columns with more
/// than `max_samples` values are tested on a random subset drawn with `seed`,
/// so repeated runs give the same answer. A sample the test rejects (constant
/// values, non-finite input) is reported as skipped.
pub fn normality_test(
    values: &[f64],
    min_samples: usize,
    max_samples: usize,
    seed: u64,
) -> NormalityTest {
    if values.len() < min_samples.max(MIN_TESTABLE_SAMPLES) {
        return NormalityTest::skipped(values.len());
    }

    let sample: Vec<f64> = if values.len() > max_samples {
        let mut rng = StdRng::seed_from_u64(seed);
        values.choose_multiple(&mut rng, max_samples).copied().collect()
    } else {
        values.to_vec()
    };
    let sample_size = sample.len();

    match ::normality::shapiro_wilk(sample) {
        Ok(result) => NormalityTest {
            sample_size,
            statistic: Some(result.statistic),
            p_value: Some(result.p_value),
            is_normal: result.p_value > SIGNIFICANCE_LEVEL,
        },
        Err(e) => {
            debug!("Shapiro-Wilk rejected sample of {}: {}", sample_size, e);
            NormalityTest::skipped(sample_size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statrs::distribution::{ContinuousCDF, Normal};

    fn normal_sample(n: usize) -> Vec<f64> {
        let dist = Normal::new(100.0, 15.0).unwrap();
        (1..=n)
            .map(|i| dist.inverse_cdf((i as f64 - 0.5) / n as f64))
            .collect()
    }

    fn exponential_sample(n: usize) -> Vec<f64> {
        (1..=n)
            .map(|i| -(1.0 - (i as f64 - 0.5) / n as f64).ln())
            .collect()
    }

    #[test]
    fn test_normal_data_is_accepted() {
        let result = normality_test(&normal_sample(200), 50, 5000, 42);
        assert!(result.was_run());
        assert!(result.statistic.unwrap() > 0.99);
        assert!(result.is_normal, "p = {:?}", result.p_value);
    }

    #[test]
    fn test_skewed_data_is_rejected() {
        let result = normality_test(&exponential_sample(200), 50, 5000, 42);
        assert!(result.was_run());
        assert!(result.p_value.unwrap() < SIGNIFICANCE_LEVEL);
        assert!(!result.is_normal);
    }

    #[test]
    fn test_small_columns_are_skipped() {
        let result = normality_test(&normal_sample(49), 50, 5000, 42);
        assert!(!result.was_run());
        assert!(!result.is_normal);
        assert_eq!(result.sample_size, 49);
    }

    #[test]
    fn test_constant_column_is_skipped() {
        let result = normality_test(&[5.0; 80], 50, 5000, 42);
        assert!(!result.was_run());
        assert_eq!(result.sample_size, 80);
    }

    #[test]
    fn test_large_columns_are_sampled_deterministically() {
        let values = normal_sample(300);
        let first = normality_test(&values, 50, 100, 7);
        let second = normality_test(&values, 50, 100, 7);
        assert_eq!(first.sample_size, 100);
        assert_eq!(first, second);
        assert!(first.was_run());
    }
}
