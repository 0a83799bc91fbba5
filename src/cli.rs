//! CLI commands for racing-form-api.
//!
//! Supports API server mode and one-shot queries against the database.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::courses::CourseTable;
use crate::query::{FormFilterParams, RaceFilterParams};
use crate::service;
use crate::stats::{compute_race_stats, RunnerStats};
use crate::storage::{FormLine, Race, RaceRepository};
use crate::types::CourseEntry;

#[derive(Parser)]
#[command(name = "racing-form-api")]
#[command(version, about = "Race, runner and form-line query API and CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List races matching the filters
    Races {
        #[command(flatten)]
        filters: RaceFilterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show a runner's form history
    Form {
        /// Runner id
        #[arg(value_name = "RUNNER_ID")]
        runner_id: i64,

        #[command(flatten)]
        filters: FormFilterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Win/place statistics for every runner in a race
    Stats {
        /// Race id
        #[arg(value_name = "RACE_ID")]
        race_id: i64,

        #[command(flatten)]
        filters: FormFilterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List courses in the database with their characteristics
    Courses {
        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Options shared by every query command
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format (json, table)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Database path override
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RaceFilterArgs {
    /// Race date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub course: Option<String>,

    #[arg(long)]
    pub going: Option<String>,

    #[arg(long)]
    pub distance: Option<String>,

    /// Race class, e.g. "Class 4"
    #[arg(long = "class")]
    pub race_class: Option<String>,

    /// Off time, e.g. 13:30
    #[arg(long)]
    pub time: Option<String>,
}

impl From<RaceFilterArgs> for RaceFilterParams {
    fn from(args: RaceFilterArgs) -> Self {
        RaceFilterParams {
            date: args.date,
            course: args.course,
            going: args.going,
            distance: args.distance,
            race_class: args.race_class,
            race_time: args.time,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct FormFilterArgs {
    /// Form-line race date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub course: Option<String>,

    #[arg(long)]
    pub going: Option<String>,

    #[arg(long)]
    pub distance: Option<String>,

    #[arg(long = "class")]
    pub race_class: Option<String>,

    /// Best finishing position to include (0 = no bound)
    #[arg(long)]
    pub min_position: Option<String>,

    /// Worst finishing position to include (0 = no bound)
    #[arg(long)]
    pub max_position: Option<String>,
}

impl From<FormFilterArgs> for FormFilterParams {
    fn from(args: FormFilterArgs) -> Self {
        FormFilterParams {
            date: args.date,
            course: args.course,
            going: args.going,
            distance: args.distance,
            race_class: args.race_class,
            min_position: args.min_position,
            max_position: args.max_position,
        }
    }
}

/// Open the configured database, honouring a `--db` override.
fn open_repository(db: Option<PathBuf>) -> Result<(AppConfig, RaceRepository)> {
    let mut config = AppConfig::load()?;
    if let Some(path) = db {
        config.database.path = path.to_string_lossy().to_string();
    }

    eprintln!("Opening database: {}", config.database.path);
    let repo = RaceRepository::new(Path::new(&config.database.path))?;
    Ok((config, repo))
}

/// Print as pretty JSON, or fall back to the table printer.
fn emit<T: Serialize>(format: &str, value: &T, table: impl FnOnce()) -> Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        "table" => table(),
        _ => {
            eprintln!("Unknown format: {}. Using JSON.", format);
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}

/// List races matching the filters.
pub fn run_races(filters: RaceFilterArgs, output: OutputArgs) -> Result<()> {
    let (_, repo) = open_repository(output.db)?;
    let races = service::list_races(&repo, filters.into())?;
    eprintln!("Found {} races", races.len());

    emit(&output.format, &races, || print_races_table(&races))
}

/// Show a runner's filtered form.
pub fn run_form(runner_id: i64, filters: FormFilterArgs, output: OutputArgs) -> Result<()> {
    let (_, repo) = open_repository(output.db)?;
    let Some(response) = service::runner_form(&repo, runner_id, filters.into())? else {
        anyhow::bail!("Runner {} not found", runner_id);
    };

    emit(&output.format, &response, || {
        println!("Runner: {} ({})", response.runner.horse_name, response.runner.id);
        println!();
        print_form_table(&response.form);
    })
}

/// Compute and print race statistics.
pub fn run_stats(race_id: i64, filters: FormFilterArgs, output: OutputArgs) -> Result<()> {
    let (_, repo) = open_repository(output.db)?;
    let stats = compute_race_stats(&repo, Some(race_id), filters.into())?;
    eprintln!("Computed stats for {} runners", stats.len());

    emit(&output.format, &stats, || print_stats_table(race_id, &stats))
}

/// List known courses.
pub fn run_courses(output: OutputArgs) -> Result<()> {
    let (config, repo) = open_repository(output.db)?;
    let table = CourseTable::load(config.courses.path.as_deref())?;
    let courses = service::course_listing(&repo, &table)?;

    emit(&output.format, &courses, || print_courses_table(&courses))
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn print_races_table(races: &[Race]) {
    println!("=== Races ===");
    println!(
        "  {:>6} {:10} {:5} {:16} {:6} {:10} {:10}",
        "ID", "Date", "Time", "Course", "Dist", "Class", "Going"
    );
    println!("  {}", "-".repeat(70));
    for race in races {
        println!(
            "  {:>6} {:10} {:5} {:16} {:6} {:10} {:10}",
            race.id,
            race.date.to_string(),
            opt(&race.race_time),
            race.course,
            opt(&race.distance),
            opt(&race.race_class),
            opt(&race.going)
        );
    }
}

fn print_form_table(form: &[FormLine]) {
    println!("=== Form ===");
    println!(
        "  {:10} {:16} {:6} {:10} {:10} {:>4}",
        "Date", "Course", "Dist", "Going", "Class", "Pos"
    );
    println!("  {}", "-".repeat(62));
    for line in form {
        let date = line
            .race_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let position = line
            .finishing_position
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:10} {:16} {:6} {:10} {:10} {:>4}",
            date,
            opt(&line.course),
            opt(&line.distance),
            opt(&line.going),
            opt(&line.race_class),
            position
        );
    }
}

fn print_stats_table(race_id: i64, stats: &[RunnerStats]) {
    println!("=== Race {} Statistics ===", race_id);
    println!();
    println!(
        "  {:24} {:>5} {:>5} {:>6} {:>8} {:>8} {:>8}",
        "Horse", "Runs", "Wins", "Places", "Win%", "Place%", "AvgPos"
    );
    println!("  {}", "-".repeat(70));
    for entry in stats {
        let s = &entry.stats;
        let avg = s
            .avg_position
            .map(|a| format!("{:.1}", a))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:24} {:>5} {:>5} {:>6} {:>7.1}% {:>7.1}% {:>8}",
            entry.runner.horse_name,
            s.total_runs,
            s.wins,
            s.places,
            s.win_rate,
            s.place_rate,
            avg
        );
    }
}

fn print_courses_table(courses: &[CourseEntry]) {
    println!("=== Courses ===");
    for course in courses {
        match &course.characteristics {
            Some(c) => println!(
                "  {:20} {:14} {:24} {}",
                course.name, c.lh_rh, c.surface, c.configuration
            ),
            None => println!("  {:20} (no characteristics)", course.name),
        }
    }
}
