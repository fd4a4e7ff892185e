//! Student performance analytics over a synthetic, seeded roster.
//!
//! The binary shows a two-option menu: class-wide analytics (tables, charts
//! and a CGPA regression) or a single student's breakdown with a remark.

pub mod analytics;
pub mod charts;
pub mod config;
pub mod data;
pub mod display;
pub mod error;
pub mod lookup;
pub mod menu;
pub mod model;
pub mod session;

pub use config::DashboardConfig;
pub use data::{generate_roster, overall_performance, Metric, Roster, StudentRecord};
pub use error::{DashboardError, Result};
pub use lookup::{lookup_student, Remark, StudentReport};
pub use menu::{parse_choice, MenuChoice};
pub use session::{Dashboard, SessionOutcome};
