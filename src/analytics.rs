use chrono::{DateTime, Utc};
use ndarray::{Array2, Axis};
use serde::Serialize;
use tracing::debug;

use crate::config::{ModelConfig, ReportConfig};
use crate::data::{Metric, Roster, StudentRecord};
use crate::error::{DashboardError, Result};
use crate::model::{fit_cgpa_model, RegressionSummary};

#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricAverage {
    pub metric: Metric,
    pub mean: f64,
}

/// Pearson coefficients, `values[i][j]` between `metrics[i]` and `metrics[j]`.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<Metric>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Metric, b: Metric) -> Option<f64> {
        let i = self.metrics.iter().position(|&m| m == a)?;
        let j = self.metrics.iter().position(|&m| m == b)?;
        Some(self.values[i][j])
    }
}

/// A record together with its generation row index.
#[derive(Debug, Clone, Serialize)]
pub struct RankedStudent {
    pub row: usize,
    pub record: StudentRecord,
}

// Chart data structures
#[derive(Debug, Clone, Serialize)]
pub struct ScatterPoint {
    pub name: String,
    pub sgpa: f64,
    pub cgpa: f64,
    pub extracurricular: u8,
    pub behaviour: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    Descending,
    Ascending,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    pub total_students: usize,
    pub preview: Vec<RankedStudent>,
    pub cgpa_histogram: Vec<HistogramBin>,
    pub scatter: Vec<ScatterPoint>,
    pub averages: Vec<MetricAverage>,
    pub correlation: CorrelationMatrix,
    pub top_performers: Vec<RankedStudent>,
    pub bottom_performers: Vec<RankedStudent>,
    pub regression: RegressionSummary,
    pub generated_at: DateTime<Utc>,
}

/// Equal-width bins over `[min, max]`. Every bin is half-open except the
/// last, which also takes the maximum.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // A single distinct value still gets a visible bin.
    let (min, max) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

/// Mean of each metric across the roster.
pub fn column_means(roster: &Roster, metrics: &[Metric]) -> Result<Vec<MetricAverage>> {
    let matrix = roster.matrix(metrics);
    let means = matrix.mean_axis(Axis(0)).ok_or(DashboardError::EmptyRoster)?;
    Ok(metrics
        .iter()
        .zip(means.iter())
        .map(|(&metric, &mean)| MetricAverage { metric, mean })
        .collect())
}

/// Pairwise Pearson correlation. Columns without variance produce NaN.
pub fn correlation_matrix(roster: &Roster, metrics: &[Metric]) -> Result<CorrelationMatrix> {
    let matrix = roster.matrix(metrics);
    let means = matrix.mean_axis(Axis(0)).ok_or(DashboardError::EmptyRoster)?;
    let centered: Array2<f64> = &matrix - &means;
    let cov = centered.t().dot(&centered);
    let std: Vec<f64> = cov.diag().iter().map(|v| v.sqrt()).collect();

    let k = metrics.len();
    let values = (0..k)
        .map(|i| {
            (0..k)
                .map(|j| {
                    let denom = std[i] * std[j];
                    if denom > 0.0 {
                        (cov[[i, j]] / denom).clamp(-1.0, 1.0)
                    } else {
                        f64::NAN
                    }
                })
                .collect()
        })
        .collect();

    Ok(CorrelationMatrix {
        metrics: metrics.to_vec(),
        values,
    })
}

/// First `n` students by overall performance. Ties keep generation order.
pub fn rank_performers(roster: &Roster, n: usize, order: RankOrder) -> Vec<RankedStudent> {
    let mut rows: Vec<(usize, &StudentRecord)> = roster.records().iter().enumerate().collect();
    match order {
        RankOrder::Descending => rows.sort_by(|a, b| b.1.overall().total_cmp(&a.1.overall())),
        RankOrder::Ascending => rows.sort_by(|a, b| a.1.overall().total_cmp(&b.1.overall())),
    }
    rows.into_iter()
        .take(n)
        .map(|(row, record)| RankedStudent {
            row,
            record: record.clone(),
        })
        .collect()
}

pub struct PerformanceAnalyzer {
    config: ReportConfig,
}

impl PerformanceAnalyzer {
    pub fn new(config: ReportConfig) -> Self {
        PerformanceAnalyzer { config }
    }

    pub fn generate_class_report(&self, roster: &Roster, model: &ModelConfig) -> Result<ClassReport> {
        if roster.is_empty() {
            return Err(DashboardError::EmptyRoster);
        }

        let preview = roster
            .records()
            .iter()
            .take(self.config.preview_rows)
            .enumerate()
            .map(|(row, record)| RankedStudent {
                row,
                record: record.clone(),
            })
            .collect();

        let cgpa_histogram = histogram(&roster.column(Metric::Cgpa), self.config.histogram_bins);
        let scatter = self.scatter_points(roster);
        let averages = column_means(roster, &Metric::COMPONENTS)?;
        let correlation = correlation_matrix(roster, &Metric::ALL)?;
        let top_performers = rank_performers(roster, self.config.ranking_size, RankOrder::Descending);
        let bottom_performers = rank_performers(roster, self.config.ranking_size, RankOrder::Ascending);
        let regression = fit_cgpa_model(roster, model)?;

        debug!(students = roster.len(), "built class report");

        Ok(ClassReport {
            total_students: roster.len(),
            preview,
            cgpa_histogram,
            scatter,
            averages,
            correlation,
            top_performers,
            bottom_performers,
            regression,
            generated_at: Utc::now(),
        })
    }

    fn scatter_points(&self, roster: &Roster) -> Vec<ScatterPoint> {
        roster
            .records()
            .iter()
            .map(|r| ScatterPoint {
                name: r.name().to_string(),
                sgpa: r.sgpa(),
                cgpa: r.cgpa(),
                extracurricular: r.extracurricular(),
                behaviour: r.behaviour(),
            })
            .collect()
    }
}
