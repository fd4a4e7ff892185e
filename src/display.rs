//! Terminal rendering of the dashboard.

use std::io::Write;

use crate::analytics::{ClassReport, CorrelationMatrix, RankedStudent};
use crate::data::StudentRecord;
use crate::error::Result;
use crate::lookup::StudentReport;

pub const BANNER: &str = "🎓 STUDENT PERFORMANCE ANALYTICS DASHBOARD 🎯";
pub const RULE: &str = "=============================================";
pub const CHOICE_PROMPT: &str = "\nEnter your choice (1 or 2): ";
pub const ROLL_PROMPT: &str = "Enter Student Roll Number (e.g., S005): ";
pub const INVALID_CHOICE: &str = "\n❌ Invalid choice. Please enter 1 or 2.";
pub const NOT_FOUND: &str = "❌ Roll Number not found. Please try again.";

/// Right-aligned plain text table. The first column is left-aligned.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    out.push_str(&render_row(headers.iter().copied(), &widths));
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths.iter())
        .enumerate()
        .map(|(i, (cell, &w))| {
            if i == 0 {
                format!("{cell:<w$}")
            } else {
                format!("{cell:>w$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn full_row(row: usize, r: &StudentRecord) -> Vec<String> {
    vec![
        row.to_string(),
        r.student_id().to_string(),
        r.name().to_string(),
        format!("{:.2}", r.cgpa()),
        format!("{:.2}", r.sgpa()),
        r.extracurricular().to_string(),
        r.behaviour().to_string(),
        format!("{:.2}", r.overall()),
    ]
}

fn ranking_table(students: &[RankedStudent]) -> String {
    let rows: Vec<Vec<String>> = students
        .iter()
        .map(|s| {
            vec![
                s.row.to_string(),
                s.record.name().to_string(),
                format!("{:.2}", s.record.cgpa()),
                format!("{:.2}", s.record.sgpa()),
                format!("{:.2}", s.record.overall()),
            ]
        })
        .collect();
    format_table(&["", "Name", "CGPA", "SGPA", "Overall_Performance"], &rows)
}

fn correlation_table(matrix: &CorrelationMatrix) -> String {
    let mut headers = vec![""];
    headers.extend(matrix.metrics.iter().map(|m| m.label()));
    let rows: Vec<Vec<String>> = matrix
        .metrics
        .iter()
        .zip(matrix.values.iter())
        .map(|(metric, values)| {
            let mut row = vec![metric.label().to_string()];
            row.extend(values.iter().map(|v| format!("{v:.2}")));
            row
        })
        .collect();
    format_table(&headers, &rows)
}

pub fn write_menu<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "{BANNER}")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "1️⃣  View Overall Class Analytics")?;
    writeln!(out, "2️⃣  View Individual Student Performance")?;
    Ok(())
}

pub fn write_class_report<W: Write>(out: &mut W, report: &ClassReport) -> Result<()> {
    writeln!(out, "\n📊 CLASS PERFORMANCE OVERVIEW\n")?;
    let preview: Vec<Vec<String>> = report
        .preview
        .iter()
        .map(|s| full_row(s.row, &s.record))
        .collect();
    write!(
        out,
        "{}",
        format_table(
            &[
                "",
                "Student_ID",
                "Name",
                "CGPA",
                "SGPA",
                "Extracurricular_Score",
                "Behaviour_Score",
                "Overall_Performance",
            ],
            &preview,
        )
    )?;
    writeln!(out, "[{} students]", report.total_students)?;

    writeln!(out, "\n📈 AVERAGE SCORES:")?;
    for avg in &report.averages {
        writeln!(out, "   {:<22} {:.2}", avg.metric.column(), avg.mean)?;
    }

    writeln!(out, "\n🔗 CORRELATION BETWEEN METRICS:")?;
    write!(out, "{}", correlation_table(&report.correlation))?;

    writeln!(out, "\n🏆 TOP {} PERFORMERS:", report.top_performers.len())?;
    write!(out, "{}", ranking_table(&report.top_performers))?;

    writeln!(out, "\n⚠️ BOTTOM {} PERFORMERS:", report.bottom_performers.len())?;
    write!(out, "{}", ranking_table(&report.bottom_performers))?;

    let model = &report.regression;
    writeln!(out, "\n🔮 Model Accuracy (R²): {:.2}", model.r2)?;
    let terms: Vec<String> = model
        .coefficients
        .iter()
        .map(|c| format!("{:+.3}*{}", c.weight, c.metric.label()))
        .collect();
    writeln!(
        out,
        "   {} ≈ {:.3} {}  (train {}, test {})",
        model.target.label(),
        model.intercept,
        terms.join(" "),
        model.train_size,
        model.test_size
    )?;
    Ok(())
}

pub fn write_student_report<W: Write>(out: &mut W, report: &StudentReport) -> Result<()> {
    let r = &report.record;
    writeln!(out, "\n📘 Student Details for {}", r.student_id())?;
    writeln!(out, "----------------------------------")?;
    writeln!(out, "Name: {}", r.name())?;
    writeln!(out, "CGPA: {:?}", r.cgpa())?;
    writeln!(out, "SGPA: {:?}", r.sgpa())?;
    writeln!(out, "Extracurricular Score: {}", r.extracurricular())?;
    writeln!(out, "Behaviour Score: {}", r.behaviour())?;
    writeln!(out, "Overall Performance: {:?}", r.overall())?;
    writeln!(out, "Remark: {}", report.remark.headline())?;
    Ok(())
}
