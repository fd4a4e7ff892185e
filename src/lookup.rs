use serde::Serialize;

use crate::data::{Roster, StudentRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Remark {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

/// Inclusive lower bounds, highest first.
const REMARK_TIERS: [(f64, Remark); 3] = [
    (9.0, Remark::Excellent),
    (8.0, Remark::Good),
    (7.0, Remark::Average),
];

impl Remark {
    pub fn classify(overall: f64) -> Self {
        REMARK_TIERS
            .iter()
            .find(|(threshold, _)| overall >= *threshold)
            .map(|&(_, remark)| remark)
            .unwrap_or(Remark::NeedsImprovement)
    }

    pub fn label(self) -> &'static str {
        match self {
            Remark::Excellent => "Excellent",
            Remark::Good => "Good",
            Remark::Average => "Average",
            Remark::NeedsImprovement => "Needs Improvement",
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Remark::Excellent => "🌟 Excellent Performance",
            Remark::Good => "👍 Good Performance",
            Remark::Average => "🙂 Average Performance",
            Remark::NeedsImprovement => "⚠️ Needs Improvement",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentReport {
    pub record: StudentRecord,
    pub remark: Remark,
}

/// Roll numbers are matched case-insensitively, ignoring surrounding blanks.
pub fn normalize_student_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn lookup_student(roster: &Roster, raw_id: &str) -> Option<StudentReport> {
    let id = normalize_student_id(raw_id);
    roster.find(&id).map(|record| StudentReport {
        record: record.clone(),
        remark: Remark::classify(record.overall()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterConfig;
    use crate::data::generate_roster;

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(Remark::classify(9.0), Remark::Excellent);
        assert_eq!(Remark::classify(8.0), Remark::Good);
        assert_eq!(Remark::classify(7.0), Remark::Average);
    }

    #[test]
    fn just_below_a_threshold_drops_a_tier() {
        assert_eq!(Remark::classify(8.99), Remark::Good);
        assert_eq!(Remark::classify(7.99), Remark::Average);
        assert_eq!(Remark::classify(6.99), Remark::NeedsImprovement);
    }

    #[test]
    fn covers_the_reachable_range() {
        assert_eq!(Remark::classify(9.8), Remark::Excellent);
        assert_eq!(Remark::classify(5.15), Remark::NeedsImprovement);
        assert_eq!(Remark::classify(f64::NAN), Remark::NeedsImprovement);
    }

    #[test]
    fn labels() {
        assert_eq!(Remark::NeedsImprovement.label(), "Needs Improvement");
        assert_eq!(Remark::Good.headline(), "👍 Good Performance");
    }

    #[test]
    fn lookup_normalizes_input() {
        let roster = generate_roster(&RosterConfig::default());
        let exact = lookup_student(&roster, "S005").unwrap();
        let sloppy = lookup_student(&roster, " s005 ").unwrap();
        assert_eq!(exact.record.student_id(), "S005");
        assert_eq!(exact.record, sloppy.record);
        assert_eq!(exact.remark, Remark::classify(exact.record.overall()));
    }

    #[test]
    fn unknown_id_is_none() {
        let roster = generate_roster(&RosterConfig::default());
        assert!(lookup_student(&roster, "S999").is_none());
        assert!(lookup_student(&roster, "").is_none());
    }
}
