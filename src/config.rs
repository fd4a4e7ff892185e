//! Dashboard settings.
//!
//! Everything has a built-in default matching the classic dashboard run
//! (30 students, seed 42, 80/20 split). The CLI in `main.rs` overrides
//! individual fields.

use std::path::PathBuf;

use crate::error::{DashboardError, Result};

/// Top-level configuration, passed explicitly into every stage.
#[derive(Debug, Clone, Default)]
pub struct DashboardConfig {
    pub roster: RosterConfig,
    pub model: ModelConfig,
    pub report: ReportConfig,
    pub charts: ChartConfig,
}

/// Synthetic roster generation.
#[derive(Debug, Clone)]
pub struct RosterConfig {
    pub students: usize,
    pub seed: u64,
}

/// CGPA regression split.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Fraction of the roster held out for scoring.
    pub test_ratio: f64,
    pub split_seed: u64,
}

/// Sizes of the class report sections.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub preview_rows: usize,
    pub ranking_size: usize,
    pub histogram_bins: usize,
}

/// Chart output. `None` disables rendering.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub out_dir: Option<PathBuf>,
}

// --- Defaults ---

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            students: 30,
            seed: 42,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            split_seed: 42,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            ranking_size: 5,
            histogram_bins: 8,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            out_dir: Some(PathBuf::from("charts")),
        }
    }
}

impl DashboardConfig {
    /// Reject settings no stage can work with.
    pub fn validate(&self) -> Result<()> {
        if self.roster.students == 0 {
            return Err(DashboardError::InvalidConfig(
                "student count must be at least 1".into(),
            ));
        }
        if !(self.model.test_ratio > 0.0 && self.model.test_ratio < 1.0) {
            return Err(DashboardError::InvalidConfig(format!(
                "test ratio must be between 0 and 1, got {}",
                self.model.test_ratio
            )));
        }
        if self.report.histogram_bins == 0 {
            return Err(DashboardError::InvalidConfig(
                "histogram needs at least one bin".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_run() {
        let config = DashboardConfig::default();
        assert_eq!(config.roster.students, 30);
        assert_eq!(config.roster.seed, 42);
        assert_eq!(config.model.split_seed, 42);
        assert!((config.model.test_ratio - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.report.histogram_bins, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_empty_roster_and_bad_ratio() {
        let mut config = DashboardConfig::default();
        config.roster.students = 0;
        assert!(matches!(
            config.validate(),
            Err(DashboardError::InvalidConfig(_))
        ));

        let mut config = DashboardConfig::default();
        config.model.test_ratio = 1.0;
        assert!(config.validate().is_err());
        config.model.test_ratio = 0.0;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.report.histogram_bins = 0;
        assert!(matches!(
            config.validate(),
            Err(DashboardError::InvalidConfig(_))
        ));
    }
}
