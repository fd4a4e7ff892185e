use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analytics::{ClassReport, PerformanceAnalyzer};
use crate::charts::ChartRenderer;
use crate::config::DashboardConfig;
use crate::data::Roster;
use crate::display;
use crate::error::Result;
use crate::lookup::{lookup_student, normalize_student_id, StudentReport};
use crate::menu::{parse_choice, MenuChoice};

/// How a dashboard session ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum SessionOutcome {
    ClassReport(ClassReport),
    StudentFound(StudentReport),
    StudentNotFound(String),
    InvalidChoice(String),
}

pub struct Dashboard<'a> {
    config: &'a DashboardConfig,
    roster: &'a Roster,
}

impl<'a> Dashboard<'a> {
    pub fn new(config: &'a DashboardConfig, roster: &'a Roster) -> Self {
        Self { config, roster }
    }

    /// Show the menu, read one choice and run the selected view.
    pub fn run<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> Result<SessionOutcome> {
        display::write_menu(out)?;
        let line = prompt(input, out, display::CHOICE_PROMPT)?;

        match parse_choice(&line) {
            MenuChoice::ClassReport => self.class_report(out),
            MenuChoice::StudentLookup => self.student_lookup(input, out),
            MenuChoice::Invalid(raw) => {
                debug!(choice = %raw, "invalid menu choice");
                writeln!(out, "{}", display::INVALID_CHOICE)?;
                Ok(SessionOutcome::InvalidChoice(raw))
            }
        }
    }

    fn class_report<W: Write>(&self, out: &mut W) -> Result<SessionOutcome> {
        let report = PerformanceAnalyzer::new(self.config.report.clone())
            .generate_class_report(self.roster, &self.config.model)?;
        display::write_class_report(out, &report)?;

        if let Some(renderer) = self.renderer()? {
            writeln!(out)?;
            for path in renderer.render_class_report(&report)? {
                write_saved(out, &path)?;
            }
        }
        Ok(SessionOutcome::ClassReport(report))
    }

    fn student_lookup<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> Result<SessionOutcome> {
        writeln!(out, "\n🎯 STUDENT PERFORMANCE CHECKER\n")?;
        let raw = prompt(input, out, display::ROLL_PROMPT)?;

        let Some(report) = lookup_student(self.roster, &raw) else {
            let id = normalize_student_id(&raw);
            info!(student = %id, "roll number not found");
            writeln!(out, "{}", display::NOT_FOUND)?;
            return Ok(SessionOutcome::StudentNotFound(id));
        };

        display::write_student_report(out, &report)?;
        if let Some(renderer) = self.renderer()? {
            let path = renderer.render_student(&report)?;
            write_saved(out, &path)?;
        }
        Ok(SessionOutcome::StudentFound(report))
    }

    fn renderer(&self) -> Result<Option<ChartRenderer>> {
        self.config
            .charts
            .out_dir
            .as_ref()
            .map(ChartRenderer::new)
            .transpose()
    }
}

/// Print `text` and read one line. End of input reads as an empty line.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> Result<String> {
    write!(out, "{text}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        warn!("input closed before an answer was given");
    }
    Ok(line)
}

fn write_saved<W: Write>(out: &mut W, path: &Path) -> Result<()> {
    writeln!(out, "🖼️  Saved chart: {}", path.display())?;
    Ok(())
}

/// Pretty-printed JSON dump of a session result.
pub fn write_outcome_json(outcome: &SessionOutcome, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, outcome)?;
    writer.flush()?;
    debug!(path = %path.display(), "wrote session json");
    Ok(())
}
