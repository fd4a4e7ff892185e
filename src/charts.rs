//! SVG rendering of the dashboard charts.
//!
//! Drawing helpers work on `Box<dyn Error>` because plotters surfaces a
//! different error type per backend; `ChartRenderer` folds them into
//! [`DashboardError::Chart`].

use std::error::Error;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::{debug, info};

use crate::analytics::{ClassReport, CorrelationMatrix, HistogramBin, ScatterPoint};
use crate::data::Metric;
use crate::error::{DashboardError, Result};
use crate::lookup::StudentReport;

type DrawResult<T> = std::result::Result<T, Box<dyn Error>>;

const FONT: &str = "sans-serif";
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const BAR_COLORS: [RGBColor; 4] = [
    RGBColor(0x5D, 0xAD, 0xE2),
    RGBColor(0x48, 0xC9, 0xB0),
    RGBColor(0xF5, 0xB0, 0x41),
    RGBColor(0xAF, 0x7A, 0xC5),
];
const COOL: RGBColor = RGBColor(59, 76, 192);
const NEUTRAL: RGBColor = RGBColor(221, 221, 221);
const WARM: RGBColor = RGBColor(180, 4, 38);
const MISSING: RGBColor = RGBColor(200, 200, 200);

pub const HISTOGRAM_FILE: &str = "cgpa_distribution.svg";
pub const SCATTER_FILE: &str = "cgpa_vs_sgpa.svg";
pub const AVERAGES_FILE: &str = "average_scores.svg";
pub const HEATMAP_FILE: &str = "correlation_heatmap.svg";

pub struct ChartRenderer {
    out_dir: PathBuf,
}

impl ChartRenderer {
    /// Creates the output directory if needed.
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        std::fs::create_dir_all(&out_dir)?;
        Ok(Self { out_dir })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Histogram, scatter, averages and heatmap, in that order.
    pub fn render_class_report(&self, report: &ClassReport) -> Result<Vec<PathBuf>> {
        let histogram = self.out_dir.join(HISTOGRAM_FILE);
        draw_histogram(&histogram, &report.cgpa_histogram).map_err(chart_error)?;

        let scatter = self.out_dir.join(SCATTER_FILE);
        draw_scatter(&scatter, &report.scatter).map_err(chart_error)?;

        let averages = self.out_dir.join(AVERAGES_FILE);
        let bars: Vec<(&str, f64)> = report
            .averages
            .iter()
            .map(|a| (a.metric.label(), a.mean))
            .collect();
        let y_max = bars.iter().map(|(_, v)| *v).fold(1.0, f64::max) * 1.15;
        draw_category_bars(&averages, "Average Scores Overview", "Average Score", &bars, y_max)
            .map_err(chart_error)?;

        let heatmap = self.out_dir.join(HEATMAP_FILE);
        draw_heatmap(&heatmap, &report.correlation).map_err(chart_error)?;

        let written = vec![histogram, scatter, averages, heatmap];
        info!(count = written.len(), dir = %self.out_dir.display(), "rendered class charts");
        Ok(written)
    }

    /// Bar chart of one student's component scores on a fixed 0-10 scale.
    pub fn render_student(&self, report: &StudentReport) -> Result<PathBuf> {
        let record = &report.record;
        let path = self
            .out_dir
            .join(format!("student_{}.svg", record.student_id()));
        let bars: Vec<(&str, f64)> = Metric::COMPONENTS
            .iter()
            .map(|&m| (m.label(), record.metric(m)))
            .collect();
        let title = format!("Performance Breakdown for {}", record.name());
        draw_category_bars(&path, &title, "Score", &bars, 10.0).map_err(chart_error)?;
        info!(path = %path.display(), "rendered student chart");
        Ok(path)
    }
}

fn chart_error(e: Box<dyn Error>) -> DashboardError {
    DashboardError::Chart(e.to_string())
}

fn svg_root(path: &Path, size: (u32, u32)) -> SVGBackend<'_> {
    debug!(path = %path.display(), "writing chart");
    SVGBackend::new(path, size)
}

fn draw_histogram(path: &Path, bins: &[HistogramBin]) -> DrawResult<()> {
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Ok(());
    };
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;

    let root = svg_root(path, (700, 400)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("CGPA Distribution", (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(first.lower..last.upper, 0.0..(max_count + 1.0))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("CGPA")
        .y_desc("Number of Students")
        .draw()?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], SKY_BLUE.filled())
    }))?;
    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], BLACK.stroke_width(1))
    }))?;

    root.present()?;
    Ok(())
}

/// Hue sweeps from blue (0) to red (9).
fn extracurricular_color(score: u8) -> HSLColor {
    let t = f64::from(score.min(9)) / 9.0;
    HSLColor((240.0 - 240.0 * t) / 360.0, 0.75, 0.5)
}

fn marker_radius(behaviour: u8) -> i32 {
    2 + i32::from(behaviour)
}

fn draw_scatter(path: &Path, points: &[ScatterPoint]) -> DrawResult<()> {
    let root = svg_root(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "CGPA vs SGPA with Extracurricular & Behaviour Influence",
            (FONT, 18),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(5.0..10.5, 5.5..10.5)?;

    chart.configure_mesh().x_desc("SGPA").y_desc("CGPA").draw()?;

    chart.draw_series(points.iter().map(|p| {
        Circle::new(
            (p.sgpa, p.cgpa),
            marker_radius(p.behaviour),
            extracurricular_color(p.extracurricular).mix(0.8).filled(),
        )
    }))?;

    // one legend entry per extracurricular score present
    let mut scores: Vec<u8> = points.iter().map(|p| p.extracurricular).collect();
    scores.sort_unstable();
    scores.dedup();
    for score in scores {
        let color = extracurricular_color(score);
        chart
            .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())?
            .label(format!("Extracurricular {score}"))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font((FONT, 11))
        .draw()?;

    root.present()?;
    Ok(())
}

/// Right edge of category `i` out of `n`.
fn segment_edge(i: u32, n: u32) -> SegmentValue<u32> {
    if i >= n {
        SegmentValue::Last
    } else {
        SegmentValue::Exact(i)
    }
}

fn segment_label(value: &SegmentValue<u32>, labels: &[&str]) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels
            .get(*i as usize)
            .map(|s| s.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn draw_category_bars(
    path: &Path,
    title: &str,
    y_desc: &str,
    bars: &[(&str, f64)],
    y_max: f64,
) -> DrawResult<()> {
    if bars.is_empty() {
        return Ok(());
    }
    let n = bars.len() as u32;
    let labels: Vec<&str> = bars.iter().map(|(label, _)| *label).collect();
    let x_fmt = |v: &SegmentValue<u32>| segment_label(v, &labels);

    let root = svg_root(path, (700, 400)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0u32..n - 1).into_segmented(), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len())
        .x_label_formatter(&x_fmt)
        .y_desc(y_desc)
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
        let i = i as u32;
        let color = BAR_COLORS[i as usize % BAR_COLORS.len()];
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (segment_edge(i + 1, n), *value)],
            color.filled(),
        );
        bar.set_margin(0, 0, 15, 15);
        bar
    }))?;

    let above = TextStyle::from((FONT, 13).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
        Text::new(
            format!("{value:.2}"),
            (SegmentValue::CenterOf(i as u32), *value),
            above.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Diverging blue-white-red scale over [-1, 1].
fn coolwarm(value: f64) -> RGBColor {
    if value.is_nan() {
        return MISSING;
    }
    let t = ((value + 1.0) / 2.0).clamp(0.0, 1.0);
    let (from, to, local) = if t < 0.5 {
        (COOL, NEUTRAL, t * 2.0)
    } else {
        (NEUTRAL, WARM, (t - 0.5) * 2.0)
    };
    let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * local).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

fn draw_heatmap(path: &Path, matrix: &CorrelationMatrix) -> DrawResult<()> {
    if matrix.metrics.is_empty() {
        return Ok(());
    }
    let n = matrix.metrics.len() as u32;
    let x_labels: Vec<&str> = matrix.metrics.iter().map(|m| m.label()).collect();
    // first metric on the top row
    let y_labels: Vec<&str> = x_labels.iter().rev().copied().collect();
    let x_fmt = |v: &SegmentValue<u32>| segment_label(v, &x_labels);
    let y_fmt = |v: &SegmentValue<u32>| segment_label(v, &y_labels);

    let root = svg_root(path, (650, 550)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation Between Metrics", (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(100)
        .build_cartesian_2d(
            (0u32..n - 1).into_segmented(),
            (0u32..n - 1).into_segmented(),
        )?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n as usize)
        .y_labels(n as usize)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .draw()?;

    let cells: Vec<(u32, u32, f64)> = matrix
        .values
        .iter()
        .enumerate()
        .flat_map(|(row, values)| {
            values
                .iter()
                .enumerate()
                .map(move |(col, value)| (row as u32, col as u32, *value))
        })
        .collect();

    chart.draw_series(cells.iter().map(|&(row, col, value)| {
        let y = n - 1 - row;
        Rectangle::new(
            [
                (SegmentValue::Exact(col), SegmentValue::Exact(y)),
                (segment_edge(col + 1, n), segment_edge(y + 1, n)),
            ],
            coolwarm(value).filled(),
        )
    }))?;

    let centered = TextStyle::from((FONT, 14).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(cells.iter().map(|&(row, col, value)| {
        let y = n - 1 - row;
        Text::new(
            format!("{value:.2}"),
            (SegmentValue::CenterOf(col), SegmentValue::CenterOf(y)),
            centered.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(c: RGBColor) -> (u8, u8, u8) {
        (c.0, c.1, c.2)
    }

    #[test]
    fn coolwarm_endpoints() {
        assert_eq!(rgb(coolwarm(-1.0)), rgb(COOL));
        assert_eq!(rgb(coolwarm(0.0)), rgb(NEUTRAL));
        assert_eq!(rgb(coolwarm(1.0)), rgb(WARM));
        assert_eq!(rgb(coolwarm(f64::NAN)), rgb(MISSING));
        assert_eq!(rgb(coolwarm(7.0)), rgb(WARM));
    }

    #[test]
    fn segment_labels_only_on_centers() {
        let labels = ["CGPA", "SGPA"];
        assert_eq!(segment_label(&SegmentValue::CenterOf(1), &labels), "SGPA");
        assert_eq!(segment_label(&SegmentValue::Exact(1), &labels), "");
        assert_eq!(segment_label(&SegmentValue::CenterOf(9), &labels), "");
    }

    #[test]
    fn last_edge_is_segment_end() {
        assert!(matches!(segment_edge(4, 4), SegmentValue::Last));
        assert!(matches!(segment_edge(2, 4), SegmentValue::Exact(2)));
    }
}
