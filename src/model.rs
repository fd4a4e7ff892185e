use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ModelConfig;
use crate::data::{Metric, Roster};
use crate::error::{DashboardError, Result};

/// Predictors for the CGPA model, in column order.
pub const FEATURES: [Metric; 3] = [Metric::Sgpa, Metric::Extracurricular, Metric::Behaviour];
pub const TARGET: Metric = Metric::Cgpa;

/// OLS needs one row per coefficient plus the intercept; R² needs spread in
/// the held-out targets.
const MIN_TRAIN_ROWS: usize = FEATURES.len() + 1;
const MIN_TEST_ROWS: usize = 2;

#[derive(Debug, Clone, Serialize)]
pub struct FeatureWeight {
    pub metric: Metric,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegressionSummary {
    pub target: Metric,
    pub intercept: f64,
    pub coefficients: Vec<FeatureWeight>,
    pub train_size: usize,
    pub test_size: usize,
    /// Coefficient of determination on the held-out rows.
    pub r2: f64,
}

/// Shuffled train/test row indices. The test share is `ceil(n * ratio)`.
pub fn split_indices(n: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let test_len = ((n as f64) * test_ratio).ceil() as usize;
    let test_len = test_len.min(n);
    let train = order.split_off(test_len);
    (train, order)
}

/// Fit CGPA ~ SGPA + Extracurricular + Behaviour and score it on a held-out
/// split.
pub fn fit_cgpa_model(roster: &Roster, config: &ModelConfig) -> Result<RegressionSummary> {
    if roster.is_empty() {
        return Err(DashboardError::EmptyRoster);
    }

    let (train_idx, test_idx) = split_indices(roster.len(), config.test_ratio, config.split_seed);
    if train_idx.len() < MIN_TRAIN_ROWS || test_idx.len() < MIN_TEST_ROWS {
        return Err(DashboardError::InsufficientData {
            needed: MIN_TRAIN_ROWS + MIN_TEST_ROWS,
            available: roster.len(),
        });
    }
    debug!(
        train = train_idx.len(),
        test = test_idx.len(),
        seed = config.split_seed,
        "split roster"
    );

    let features = roster.matrix(&FEATURES);
    let target = Array1::from(roster.column(TARGET));

    let train = Dataset::new(
        features.select(Axis(0), &train_idx),
        target.select(Axis(0), &train_idx),
    );
    let test_records = features.select(Axis(0), &test_idx);
    let test_targets = target.select(Axis(0), &test_idx);

    let model = LinearRegression::new()
        .fit(&train)
        .map_err(|e| DashboardError::Model(e.to_string()))?;

    let predictions = model.predict(&test_records);
    let r2 = predictions
        .r2(&test_targets)
        .map_err(|e| DashboardError::Model(e.to_string()))?;

    let coefficients = FEATURES
        .iter()
        .zip(model.params().iter())
        .map(|(&metric, &weight)| FeatureWeight { metric, weight })
        .collect();

    info!(r2, intercept = model.intercept(), "fitted cgpa model");

    Ok(RegressionSummary {
        target: TARGET,
        intercept: model.intercept(),
        coefficients,
        train_size: train_idx.len(),
        test_size: test_idx.len(),
        r2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterConfig;
    use crate::data::{generate_roster, StudentRecord};

    #[test]
    fn split_is_eighty_twenty_and_disjoint() {
        let (train, test) = split_indices(30, 0.2, 42);
        assert_eq!(train.len(), 24);
        assert_eq!(test.len(), 6);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_reproducible() {
        assert_eq!(split_indices(30, 0.2, 42), split_indices(30, 0.2, 42));
    }

    #[test]
    fn default_roster_fits() {
        let roster = generate_roster(&RosterConfig::default());
        let summary = fit_cgpa_model(&roster, &ModelConfig::default()).unwrap();
        assert_eq!(summary.train_size, 24);
        assert_eq!(summary.test_size, 6);
        assert_eq!(summary.coefficients.len(), 3);
        assert!(summary.r2.is_finite());
        assert!(summary.r2 <= 1.0);
    }

    #[test]
    fn recovers_an_exact_linear_relationship() {
        // cgpa = 1.0 + 0.5*sgpa + 0.1*extra + 0.2*behaviour
        let records = (0..40)
            .map(|i| {
                let sgpa = 5.5 + (i % 9) as f64 * 0.5;
                let extra = (i % 10) as u8;
                let behaviour = 5 + (i % 5) as u8;
                let cgpa = 1.0 + 0.5 * sgpa + 0.1 * f64::from(extra) + 0.2 * f64::from(behaviour);
                StudentRecord::new(format!("S{:03}", i + 1), "x", cgpa, sgpa, extra, behaviour)
            })
            .collect();
        let roster = Roster::new(records);

        let summary = fit_cgpa_model(&roster, &ModelConfig::default()).unwrap();
        assert!((summary.r2 - 1.0).abs() < 1e-6, "r2 = {}", summary.r2);
        assert!((summary.intercept - 1.0).abs() < 1e-6);
        let weights: Vec<f64> = summary.coefficients.iter().map(|c| c.weight).collect();
        assert!((weights[0] - 0.5).abs() < 1e-6);
        assert!((weights[1] - 0.1).abs() < 1e-6);
        assert!((weights[2] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn tiny_roster_is_rejected() {
        let roster = generate_roster(&RosterConfig {
            students: 4,
            seed: 42,
        });
        assert!(matches!(
            fit_cgpa_model(&roster, &ModelConfig::default()),
            Err(DashboardError::InsufficientData { .. })
        ));
    }

    #[test]
    fn empty_roster_is_rejected() {
        let roster = Roster::new(Vec::new());
        assert!(matches!(
            fit_cgpa_model(&roster, &ModelConfig::default()),
            Err(DashboardError::EmptyRoster)
        ));
    }
}
