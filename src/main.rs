use std::io::{self, BufReader, Cursor, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use student_dashboard::config::{ChartConfig, ModelConfig, ReportConfig, RosterConfig};
use student_dashboard::data::write_roster_csv;
use student_dashboard::session::write_outcome_json;
use student_dashboard::{generate_roster, Dashboard, DashboardConfig};

#[derive(Parser)]
#[command(
    name = "student-dashboard",
    version,
    about = "Student performance analytics dashboard"
)]
struct Cli {
    /// Number of synthetic students
    #[arg(long, env = "DASHBOARD_STUDENTS", default_value_t = 30)]
    students: usize,

    /// Seed for roster generation
    #[arg(long, env = "DASHBOARD_SEED", default_value_t = 42)]
    seed: u64,

    /// Seed for the regression train/test shuffle
    #[arg(long, env = "DASHBOARD_SPLIT_SEED", default_value_t = 42)]
    split_seed: u64,

    /// Share of students held out to score the regression
    #[arg(long, default_value_t = 0.2)]
    test_ratio: f64,

    /// Directory for SVG charts
    #[arg(long, env = "DASHBOARD_CHART_DIR", default_value = "charts")]
    chart_dir: PathBuf,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Write the generated roster to a CSV file
    #[arg(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,

    /// Write the session result as JSON
    #[arg(long, value_name = "PATH")]
    export_json: Option<PathBuf>,

    /// Answer the menu prompt (1 or 2) instead of reading stdin
    #[arg(long)]
    choice: Option<String>,

    /// Answer the roll number prompt instead of reading stdin
    #[arg(long, value_name = "ID")]
    student: Option<String>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            roster: RosterConfig {
                students: self.students,
                seed: self.seed,
            },
            model: ModelConfig {
                test_ratio: self.test_ratio,
                split_seed: self.split_seed,
            },
            report: ReportConfig::default(),
            charts: ChartConfig {
                out_dir: (!self.no_charts).then(|| self.chart_dir.clone()),
            },
        }
    }

    /// Pre-answered prompts, consumed before stdin. `--student` alone implies
    /// the lookup view.
    fn scripted_answers(&self) -> String {
        let choice = self
            .choice
            .as_deref()
            .or_else(|| self.student.as_ref().map(|_| "2"));
        [choice, self.student.as_deref()]
            .into_iter()
            .flatten()
            .map(|answer| format!("{answer}\n"))
            .collect()
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.dashboard_config();
    config.validate()?;

    let roster = generate_roster(&config.roster);
    info!(
        students = roster.len(),
        seed = config.roster.seed,
        "roster ready"
    );

    if let Some(path) = &cli.export_csv {
        write_roster_csv(&roster, path)
            .with_context(|| format!("exporting roster to {}", path.display()))?;
    }

    let stdin = io::stdin();
    let mut input = BufReader::new(Cursor::new(cli.scripted_answers()).chain(stdin.lock()));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let outcome = Dashboard::new(&config, &roster)
        .run(&mut input, &mut out)
        .context("dashboard session failed")?;

    if let Some(path) = &cli.export_json {
        write_outcome_json(&outcome, path)
            .with_context(|| format!("exporting session to {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("student-dashboard").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn no_flags_means_interactive_prompts() {
        assert_eq!(parse(&[]).scripted_answers(), "");
    }

    #[test]
    fn student_alone_selects_lookup() {
        assert_eq!(parse(&["--student", "S005"]).scripted_answers(), "2\nS005\n");
    }

    #[test]
    fn choice_is_answered_before_student() {
        assert_eq!(
            parse(&["--choice", "1", "--student", "S005"]).scripted_answers(),
            "1\nS005\n"
        );
        assert_eq!(parse(&["--choice", "1"]).scripted_answers(), "1\n");
    }

    #[test]
    fn scripted_answers_come_before_stdin() {
        let cli = parse(&["--student", "s007"]);
        let mut input =
            BufReader::new(Cursor::new(cli.scripted_answers()).chain(Cursor::new("ignored\n")));
        let mut lines = Vec::new();
        let mut line = String::new();
        while std::io::BufRead::read_line(&mut input, &mut line).unwrap() > 0 {
            lines.push(std::mem::take(&mut line));
        }
        assert_eq!(lines, ["2\n", "s007\n", "ignored\n"]);
    }

    #[test]
    fn flags_map_onto_config() {
        let config = parse(&[
            "--students",
            "12",
            "--seed",
            "7",
            "--split-seed",
            "9",
            "--test-ratio",
            "0.25",
            "--chart-dir",
            "out",
        ])
        .dashboard_config();
        assert_eq!(config.roster.students, 12);
        assert_eq!(config.roster.seed, 7);
        assert_eq!(config.model.split_seed, 9);
        assert_eq!(config.model.test_ratio, 0.25);
        assert_eq!(config.charts.out_dir, Some(PathBuf::from("out")));
        assert_eq!(config.report.histogram_bins, 8);
    }

    #[test]
    fn no_charts_clears_chart_dir() {
        let config = parse(&["--no-charts", "--chart-dir", "out"]).dashboard_config();
        assert_eq!(config.charts.out_dir, None);
    }

    #[test]
    fn verbosity_counts_repeats() {
        assert_eq!(parse(&["-vv"]).verbose, 2);
        assert!(Cli::try_parse_from(["student-dashboard", "--students", "many"]).is_err());
    }
}
