//! Descriptive statistics and grouped aggregates over the analysis frame.

use crate::utils::{sorted_copy, sorted_quantile};
use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one numeric column, in the shape of a `describe()` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1). Zero for a single value.
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl DescriptiveStats {
    /// Describe `values`. Returns `None` when there is nothing to describe.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted_copy(values);
        let count = sorted.len();
        let first = *sorted.first()?;
        let last = *sorted.last()?;

        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let variance =
                sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        Some(Self {
            count,
            mean,
            std,
            min: first,
            q1: sorted_quantile(&sorted, 0.25)?,
            median: sorted_quantile(&sorted, 0.5)?,
            q3: sorted_quantile(&sorted, 0.75)?,
            max: last,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Tukey fences: `[q1 - 1.5 * iqr, q3 + 1.5 * iqr]`.
    pub fn outlier_bounds(&self) -> (f64, f64) {
        let iqr = self.iqr();
        (self.q1 - 1.5 * iqr, self.q3 + 1.5 * iqr)
    }
}

/// Values outside the Tukey fences of `values`.
pub fn iqr_outliers(values: &[f64]) -> Vec<f64> {
    let Some(stats) = DescriptiveStats::from_values(values) else {
        return Vec::new();
    };
    let (lower, upper) = stats.outlier_bounds();
    values
        .iter()
        .copied()
        .filter(|v| *v < lower || *v > upper)
        .collect()
}

/// One bar of a histogram, covering `[lower, upper)` (the last bin is closed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Split `values` into `bins` equal-width bins between min and max.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for value in values {
        let index = (((value - min) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Mean of a measure within one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStat {
    pub label: String,
    pub mean: f64,
    pub count: usize,
}

/// Number of rows carrying one category value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Mean of `value` per distinct `group`, sorted by label. Rows with a
/// missing group are dropped.
pub fn group_means(df: &DataFrame, group: &str, value: &str) -> Result<Vec<GroupStat>> {
    let grouped = df
        .clone()
        .lazy()
        .filter(col(group).is_not_null())
        .group_by([col(group)])
        .agg([
            col(value).cast(DataType::Float64).mean().alias("mean"),
            col(value).count().alias("count"),
        ])
        .collect()?;

    let labels = grouped.column(group)?.as_materialized_series().cast(&DataType::String)?;
    let means = grouped.column("mean")?.as_materialized_series().cast(&DataType::Float64)?;
    let counts = grouped.column("count")?.as_materialized_series().cast(&DataType::UInt64)?;

    let mut stats: Vec<GroupStat> = labels
        .str()?
        .into_iter()
        .zip(means.f64()?.into_iter())
        .zip(counts.u64()?.into_iter())
        .filter_map(|((label, mean), count)| {
            Some(GroupStat {
                label: label?.to_string(),
                mean: mean?,
                count: count? as usize,
            })
        })
        .collect();
    stats.sort_by(|a, b| a.label.cmp(&b.label));
    Ok(stats)
}

/// Row counts per distinct value of `column`, most frequent first.
pub fn category_counts(df: &DataFrame, column: &str) -> Result<Vec<CategoryCount>> {
    let grouped = df
        .clone()
        .lazy()
        .filter(col(column).is_not_null())
        .group_by([col(column)])
        .agg([col(column).count().alias("count")])
        .collect()?;

    let labels = grouped.column(column)?.as_materialized_series().cast(&DataType::String)?;
    let counts = grouped.column("count")?.as_materialized_series().cast(&DataType::UInt64)?;

    let mut result: Vec<CategoryCount> = labels
        .str()?
        .into_iter()
        .zip(counts.u64()?.into_iter())
        .filter_map(|(label, count)| {
            Some(CategoryCount {
                label: label?.to_string(),
                count: count? as usize,
            })
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    Ok(result)
}

/// Values of `value` collected per `group`, keyed by label.
pub fn group_values(df: &DataFrame, group: &str, value: &str) -> Result<BTreeMap<String, Vec<f64>>> {
    let labels = df.column(group)?.as_materialized_series().cast(&DataType::String)?;
    let values = df.column(value)?.as_materialized_series().cast(&DataType::Float64)?;

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (label, v) in labels.str()?.into_iter().zip(values.f64()?.into_iter()) {
        if let (Some(label), Some(v)) = (label, v) {
            groups.entry(label.to_string()).or_default().push(v);
        }
    }
    Ok(groups)
}
