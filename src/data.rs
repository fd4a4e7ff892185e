use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::config::RosterConfig;
use crate::error::Result;

const CGPA_RANGE: std::ops::Range<f64> = 6.0..10.0;
const SGPA_RANGE: std::ops::Range<f64> = 5.5..10.0;
const EXTRACURRICULAR_RANGE: std::ops::RangeInclusive<u8> = 0..=9;
const BEHAVIOUR_RANGE: std::ops::RangeInclusive<u8> = 5..=9;

/// Round to two decimal places, halves to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Weighted composite score. Only the final sum is rounded.
pub fn overall_performance(cgpa: f64, sgpa: f64, extracurricular: u8, behaviour: u8) -> f64 {
    round2(
        0.5 * cgpa
            + 0.3 * sgpa
            + 0.1 * f64::from(extracurricular)
            + 0.1 * f64::from(behaviour),
    )
}

/// One row of the roster. The overall score is derived on construction and
/// cannot be set independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    #[serde(rename = "Student_ID")]
    student_id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "CGPA")]
    cgpa: f64,
    #[serde(rename = "SGPA")]
    sgpa: f64,
    #[serde(rename = "Extracurricular_Score")]
    extracurricular: u8,
    #[serde(rename = "Behaviour_Score")]
    behaviour: u8,
    #[serde(rename = "Overall_Performance")]
    overall: f64,
}

impl StudentRecord {
    pub fn new(
        student_id: impl Into<String>,
        name: impl Into<String>,
        cgpa: f64,
        sgpa: f64,
        extracurricular: u8,
        behaviour: u8,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            name: name.into(),
            cgpa,
            sgpa,
            extracurricular,
            behaviour,
            overall: overall_performance(cgpa, sgpa, extracurricular, behaviour),
        }
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cgpa(&self) -> f64 {
        self.cgpa
    }

    pub fn sgpa(&self) -> f64 {
        self.sgpa
    }

    pub fn extracurricular(&self) -> u8 {
        self.extracurricular
    }

    pub fn behaviour(&self) -> u8 {
        self.behaviour
    }

    pub fn overall(&self) -> f64 {
        self.overall
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Cgpa => self.cgpa,
            Metric::Sgpa => self.sgpa,
            Metric::Extracurricular => f64::from(self.extracurricular),
            Metric::Behaviour => f64::from(self.behaviour),
            Metric::Overall => self.overall,
        }
    }
}

/// Numeric columns of a student record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    #[serde(rename = "CGPA")]
    Cgpa,
    #[serde(rename = "SGPA")]
    Sgpa,
    #[serde(rename = "Extracurricular_Score")]
    Extracurricular,
    #[serde(rename = "Behaviour_Score")]
    Behaviour,
    #[serde(rename = "Overall_Performance")]
    Overall,
}

impl Metric {
    /// The four raw component scores.
    pub const COMPONENTS: [Metric; 4] = [
        Metric::Cgpa,
        Metric::Sgpa,
        Metric::Extracurricular,
        Metric::Behaviour,
    ];

    pub const ALL: [Metric; 5] = [
        Metric::Cgpa,
        Metric::Sgpa,
        Metric::Extracurricular,
        Metric::Behaviour,
        Metric::Overall,
    ];

    /// Table header name.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Cgpa => "CGPA",
            Metric::Sgpa => "SGPA",
            Metric::Extracurricular => "Extracurricular_Score",
            Metric::Behaviour => "Behaviour_Score",
            Metric::Overall => "Overall_Performance",
        }
    }

    /// Short label for chart axes.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Cgpa => "CGPA",
            Metric::Sgpa => "SGPA",
            Metric::Extracurricular => "Extracurricular",
            Metric::Behaviour => "Behaviour",
            Metric::Overall => "Overall",
        }
    }
}

/// Immutable table of generated students, in generation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    records: Vec<StudentRecord>,
}

impl Roster {
    pub fn new(records: Vec<StudentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, student_id: &str) -> Option<&StudentRecord> {
        self.records.iter().find(|r| r.student_id == student_id)
    }

    pub fn column(&self, metric: Metric) -> Vec<f64> {
        self.records.iter().map(|r| r.metric(metric)).collect()
    }

    /// Rows = students, columns = `metrics` in the given order.
    pub fn matrix(&self, metrics: &[Metric]) -> Array2<f64> {
        Array2::from_shape_fn((self.records.len(), metrics.len()), |(row, col)| {
            self.records[row].metric(metrics[col])
        })
    }
}

/// Build the synthetic roster. Each column is drawn in full before the next
/// one, so a given seed and count always produce the same table.
pub fn generate_roster(config: &RosterConfig) -> Roster {
    let n = config.students;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let cgpa: Vec<f64> = (0..n).map(|_| round2(rng.gen_range(CGPA_RANGE))).collect();
    let sgpa: Vec<f64> = (0..n).map(|_| round2(rng.gen_range(SGPA_RANGE))).collect();
    let extracurricular: Vec<u8> = (0..n)
        .map(|_| rng.gen_range(EXTRACURRICULAR_RANGE))
        .collect();
    let behaviour: Vec<u8> = (0..n).map(|_| rng.gen_range(BEHAVIOUR_RANGE)).collect();

    let records = (0..n)
        .map(|i| {
            StudentRecord::new(
                format!("S{:03}", i + 1),
                format!("Student_{}", i + 1),
                cgpa[i],
                sgpa[i],
                extracurricular[i],
                behaviour[i],
            )
        })
        .collect();

    debug!(students = n, seed = config.seed, "generated roster");
    Roster::new(records)
}

/// Write the roster as CSV with the dashboard's column headers.
pub fn write_roster_csv(roster: &Roster, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in roster.records() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    debug!(path = %path.display(), rows = roster.len(), "wrote roster csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(students: usize, seed: u64) -> Roster {
        generate_roster(&RosterConfig { students, seed })
    }

    #[test]
    fn overall_rounds_only_the_final_sum() {
        // 0.5*7.45 + 0.3*8.15 + 0.1*3 + 0.1*7 = 3.725 + 2.445 + 1.0 = 7.17
        assert_eq!(overall_performance(7.45, 8.15, 3, 7), 7.17);
        assert_eq!(overall_performance(10.0, 10.0, 9, 9), 9.8);
        assert_eq!(overall_performance(6.0, 5.5, 0, 5), 5.15);
    }

    #[test]
    fn halfway_sums_round_to_even() {
        // 3.0 + 1.665 + 0.0 + 0.5 = 5.165
        assert_eq!(overall_performance(6.0, 5.55, 0, 5), 5.16);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
    }

    #[test]
    fn same_seed_same_roster() {
        assert_eq!(roster(30, 42), roster(30, 42));
        assert_ne!(roster(30, 42), roster(30, 7));
    }

    #[test]
    fn ids_and_names_follow_generation_order() {
        let roster = roster(30, 42);
        assert_eq!(roster.len(), 30);
        assert_eq!(roster.records()[0].student_id(), "S001");
        assert_eq!(roster.records()[0].name(), "Student_1");
        assert_eq!(roster.records()[29].student_id(), "S030");
        assert_eq!(roster.records()[29].name(), "Student_30");
    }

    #[test]
    fn fields_stay_in_their_domains() {
        for r in roster(200, 3).records() {
            assert!((6.0..=10.0).contains(&r.cgpa()), "cgpa {}", r.cgpa());
            assert!((5.5..=10.0).contains(&r.sgpa()), "sgpa {}", r.sgpa());
            assert!(r.extracurricular() <= 9);
            assert!((5..=9).contains(&r.behaviour()));
            assert_eq!(round2(r.cgpa()), r.cgpa());
            assert_eq!(round2(r.sgpa()), r.sgpa());
        }
    }

    #[test]
    fn matrix_follows_requested_column_order() {
        let roster = roster(4, 1);
        let m = roster.matrix(&[Metric::Behaviour, Metric::Cgpa]);
        assert_eq!(m.dim(), (4, 2));
        for (row, r) in roster.records().iter().enumerate() {
            assert_eq!(m[[row, 0]], f64::from(r.behaviour()));
            assert_eq!(m[[row, 1]], r.cgpa());
        }
    }

    #[test]
    fn find_is_exact_match() {
        let roster = roster(30, 42);
        assert!(roster.find("S005").is_some());
        assert!(roster.find("s005").is_none());
        assert!(roster.find("S999").is_none());
    }
}
