use super::{ChartKind, ChartSpec};
use crate::analysis::{DatasetAnalysis, frame, statistics};
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use plotters::data::Quartiles;
use plotters::element::{Boxplot, Pie};
use plotters::prelude::*;
use polars::prelude::DataFrame;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CHART_SIZE: (u32, u32) = (1000, 600);
const PIE_SIZE: (u32, u32) = (800, 800);
const FONT: &str = "sans-serif";

/// Writes the descriptive charts for an analysis frame.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    output_dir: PathBuf,
    histogram_bins: usize,
    top_categories: usize,
}

impl ChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let defaults = AuditConfig::default();
        Self {
            output_dir: output_dir.into(),
            histogram_bins: defaults.histogram_bins,
            top_categories: defaults.top_cities,
        }
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            histogram_bins: config.histogram_bins,
            top_categories: config.top_cities,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render every chart in [`ChartKind::ALL`].
    ///
    /// An empty frame writes nothing. Charts whose columns hold no values are
    /// skipped with a warning. Returns the paths of the files written.
    pub fn render_all(&self, df: &DataFrame, analysis: &DatasetAnalysis) -> Result<Vec<PathBuf>> {
        if df.height() == 0 {
            warn!("Cannot plot charts: no records passed the cleaning filter");
            return Ok(Vec::new());
        }

        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            AuditError::from(e).with_context(format!(
                "Creating chart directory {}",
                self.output_dir.display()
            ))
        })?;

        let mut written = Vec::new();
        for kind in ChartKind::ALL {
            if let Some(path) = self.render(kind, df, analysis)? {
                written.push(path);
            }
        }

        info!(
            "Wrote {} charts to {}",
            written.len(),
            self.output_dir.display()
        );
        Ok(written)
    }

    /// Render one chart. Returns `None` when the chart had nothing to draw.
    pub fn render(
        &self,
        kind: ChartKind,
        df: &DataFrame,
        analysis: &DatasetAnalysis,
    ) -> Result<Option<PathBuf>> {
        let path = self.output_dir.join(kind.file_name());
        let drawn = self
            .draw(kind, &path, df, analysis)
            .map_err(|e| AuditError::ChartRenderFailed {
                chart: kind.file_stem().to_string(),
                reason: format!("{:#}", e),
            })?;

        if drawn {
            debug!("Saved {}", path.display());
            Ok(Some(path))
        } else {
            warn!("Cannot plot {}: no values to draw", kind.title());
            Ok(None)
        }
    }

    fn draw(
        &self,
        kind: ChartKind,
        path: &Path,
        df: &DataFrame,
        analysis: &DatasetAnalysis,
    ) -> anyhow::Result<bool> {
        let title = kind.title();
        match kind.spec() {
            ChartSpec::Scatter {
                x,
                y,
                group,
                x_label,
                y_label,
            } => {
                let points = frame::grouped_points(df, x, y, group)?;
                draw_scatter(path, title, &points, x_label, y_label)
            }
            ChartSpec::Histogram {
                column,
                x_label,
                color,
            } => {
                let values = frame::numeric_values(df, column)?;
                let bins = statistics::histogram(&values, self.histogram_bins);
                let p_value = analysis.normality.get(column).and_then(|t| t.p_value);
                let (r, g, b) = color;
                draw_histogram(path, title, &bins, x_label, RGBColor(r, g, b), p_value)
            }
            ChartSpec::Boxplot {
                group,
                value,
                y_label,
            } => {
                let groups = statistics::group_values(df, group, value)?;
                draw_boxplot(path, title, &groups, y_label)
            }
            ChartSpec::Bar {
                column,
                x_label,
                top,
            } => {
                let mut counts = statistics::category_counts(df, column)?;
                if top {
                    counts.truncate(self.top_categories);
                }
                draw_bars(path, title, &counts, x_label)
            }
            ChartSpec::Pie { column } => {
                let counts = statistics::category_counts(df, column)?;
                draw_pie(path, title, &counts)
            }
        }
    }
}

fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let pad = ((max - min) * 0.05).max(1.0);
    (min - pad)..(max + pad)
}

fn series_color(index: usize) -> RGBColor {
    let (r, g, b) = Palette99::pick(index).rgb();
    RGBColor(r, g, b)
}

fn draw_scatter(
    path: &Path,
    title: &str,
    points: &[(f64, f64, String)],
    x_label: &str,
    y_label: &str,
) -> anyhow::Result<bool> {
    if points.is_empty() {
        return Ok(false);
    }

    let mut groups: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for (x, y, group) in points {
        groups.entry(group.as_str()).or_default().push((*x, *y));
    }

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(
            padded_range(points.iter().map(|p| p.0)),
            padded_range(points.iter().map(|p| p.1)),
        )?;
    chart.configure_mesh().x_desc(x_label).y_desc(y_label).draw()?;

    for (index, (label, group_points)) in groups.into_iter().enumerate() {
        let color = series_color(index).mix(0.6);
        chart
            .draw_series(
                group_points
                    .into_iter()
                    .map(move |p| Circle::new(p, 3, color.filled())),
            )?
            .label(label)
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(true)
}

fn draw_histogram(
    path: &Path,
    title: &str,
    bins: &[statistics::HistogramBin],
    x_label: &str,
    color: RGBColor,
    p_value: Option<f64>,
) -> anyhow::Result<bool> {
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Ok(false);
    };
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(first.lower..last.upper, 0usize..(max_count + max_count / 10 + 1))?;
    chart.configure_mesh().x_desc(x_label).y_desc("Frequency").draw()?;

    chart.draw_series(bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.lower, 0usize), (bin.upper, bin.count)],
            color.mix(0.7).filled(),
        )
    }))?;

    if let Some(p) = p_value {
        root.draw(&Text::new(
            format!("Shapiro-Wilk p-value: {:.4}", p),
            (120, 70),
            (FONT, 16).into_font(),
        ))?;
    }

    root.present()?;
    Ok(true)
}

fn draw_boxplot(
    path: &Path,
    title: &str,
    groups: &BTreeMap<String, Vec<f64>>,
    y_label: &str,
) -> anyhow::Result<bool> {
    if groups.is_empty() {
        return Ok(false);
    }

    let labels: Vec<String> = groups.keys().cloned().collect();
    let range = padded_range(groups.values().flatten().copied());

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(
            labels[..].into_segmented(),
            range.start as f32..range.end as f32,
        )?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(label) | SegmentValue::Exact(label) => label.to_string(),
            SegmentValue::Last => String::new(),
        })
        .y_desc(y_label)
        .draw()?;

    chart.draw_series(groups.iter().enumerate().map(|(index, (label, values))| {
        Boxplot::new_vertical(
            SegmentValue::CenterOf(label),
            &Quartiles::new(values.as_slice()),
        )
        .width(40)
        .whisker_width(0.5)
        .style(series_color(index))
    }))?;

    root.present()?;
    Ok(true)
}

fn draw_bars(
    path: &Path,
    title: &str,
    counts: &[statistics::CategoryCount],
    x_label: &str,
) -> anyhow::Result<bool> {
    if counts.is_empty() {
        return Ok(false);
    }

    let labels: Vec<&str> = counts.iter().map(|c| c.label.as_str()).collect();
    let max_count = counts.iter().map(|c| c.count).max().unwrap_or(0);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 24))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (0..labels.len() as i32).into_segmented(),
            0usize..(max_count + max_count / 10 + 1),
        )?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(i) => labels
                .get(*i as usize)
                .map(|label| label.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc(x_label)
        .y_desc("Count")
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(series_color(0).mix(0.8).filled())
            .margin(8)
            .data(counts.iter().enumerate().map(|(i, c)| (i as i32, c.count))),
    )?;

    root.present()?;
    Ok(true)
}

fn draw_pie(path: &Path, title: &str, counts: &[statistics::CategoryCount]) -> anyhow::Result<bool> {
    if counts.is_empty() {
        return Ok(false);
    }

    let sizes: Vec<f64> = counts.iter().map(|c| c.count as f64).collect();
    let labels: Vec<&str> = counts.iter().map(|c| c.label.as_str()).collect();
    let colors: Vec<RGBColor> = (0..counts.len()).map(series_color).collect();

    let root = SVGBackend::new(path, PIE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(title, (FONT, 24))?;

    let (width, height) = root.dim_in_pixel();
    let center = ((width / 2) as i32, (height / 2) as i32);
    let radius = f64::from(width.min(height)) * 0.35;

    let mut pie = Pie::new(&center, &radius, &sizes[..], &colors[..], &labels[..]);
    pie.start_angle(140.0);
    pie.label_style((FONT, 18).into_font().color(&BLACK));
    pie.percentages((FONT, 14).into_font().color(&WHITE));
    root.draw(&pie)?;

    root.present()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::types::EmployeeRecord;
    use crate::validator::CheckContext;
    use chrono::NaiveDate;

    fn records() -> Vec<EmployeeRecord> {
        (0..30)
            .map(|row| EmployeeRecord {
                row,
                employee_id: Some(format!("EMP{:09}", row)),
                base_salary: Some(35_000.0 + 1_500.0 * row as f64),
                hire_date: NaiveDate::from_ymd_opt(2018, 1, 1),
                days_service: Some(2_600.0 + row as f64),
                performance_score: Some(40.0 + row as f64),
                birth_date: NaiveDate::from_ymd_opt(1970 + (row % 20) as i32, 3, 1),
                vacation_days: Some((row % 20) as f64),
                gender: Some(["F", "M", "Other"][row % 3].to_string()),
                department: Some(["Sales", "IT", "HR", "Finance"][row % 4].to_string()),
                education: Some("Bachelor".to_string()),
                city: Some(format!("City {}", row % 12)),
                state: Some(["CA", "NY"][row % 2].to_string()),
                employee_level: Some(["Junior", "Senior"][row % 2].to_string()),
                work_location: Some("Remote".to_string()),
                shift: Some(["Day", "Night"][row % 2].to_string()),
                status: Some("Active".to_string()),
                ..Default::default()
            })
            .collect()
    }

    fn frame_and_analysis(records: &[EmployeeRecord]) -> (DataFrame, DatasetAnalysis) {
        let as_of = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let analyzer = Analyzer::new(&AuditConfig::default(), CheckContext::new(as_of));
        let df = analyzer.frame(records).unwrap();
        let analysis = analyzer.analyze(&df, records.len()).unwrap();
        (df, analysis)
    }

    #[test]
    fn test_render_all_writes_every_chart() {
        let dir = tempfile::tempdir().unwrap();
        let (df, analysis) = frame_and_analysis(&records());

        let renderer = ChartRenderer::new(dir.path().join("plots"));
        let written = renderer.render_all(&df, &analysis).unwrap();

        assert_eq!(written.len(), ChartKind::ALL.len());
        for kind in ChartKind::ALL {
            let path = dir.path().join("plots").join(kind.file_name());
            let content = std::fs::read_to_string(&path).unwrap();
            assert!(content.contains("<svg"), "{} is not an svg", kind);
        }
    }

    #[test]
    fn test_render_all_skips_empty_frame() {
        let dir = tempfile::tempdir().unwrap();
        let (df, analysis) = frame_and_analysis(&[]);

        let renderer = ChartRenderer::new(dir.path().join("plots"));
        assert!(renderer.render_all(&df, &analysis).unwrap().is_empty());
        assert!(!dir.path().join("plots").exists());
    }

    #[test]
    fn test_chart_without_values_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let records: Vec<EmployeeRecord> = records()
            .into_iter()
            .map(|r| EmployeeRecord { shift: None, ..r })
            .collect();
        let (df, analysis) = frame_and_analysis(&records);

        let renderer = ChartRenderer::new(dir.path());
        let written = renderer.render_all(&df, &analysis).unwrap();
        assert_eq!(written.len(), ChartKind::ALL.len() - 1);
        assert!(!dir.path().join("shift_distribution.svg").exists());
    }

    #[test]
    fn test_padded_range_handles_single_value() {
        let range = padded_range([5.0].into_iter());
        assert!(range.start < 5.0 && range.end > 5.0);
    }
}
