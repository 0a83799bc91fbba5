//! Per-runner form statistics for a race.
//!
//! All form lines for every runner in the race are fetched with one batched
//! query, then grouped by runner and folded into a [`FormStats`] block.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::error::QueryError;
use crate::query::{build_form_query, FormFilterParams, FormScope};
use crate::storage::{FormLine, RecordStore, Runner};

/// Positions up to and including this count as placed
pub const PLACE_CUTOFF: u32 = 3;

/// Win/place summary over a set of form lines
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormStats {
    pub total_runs: u32,
    pub wins: u32,
    pub places: u32,
    /// Percentage, one decimal place
    pub win_rate: f64,
    /// Percentage, one decimal place
    pub place_rate: f64,
    /// Mean of known finishing positions, one decimal place
    pub avg_position: Option<f64>,
}

impl FormStats {
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a FormLine>) -> Self {
        let mut total_runs = 0u32;
        let mut wins = 0u32;
        let mut places = 0u32;
        let mut position_sum = 0u64;
        let mut positioned = 0u32;

        for line in lines {
            total_runs += 1;
            if let Some(position) = line.finishing_position {
                if position == 1 {
                    wins += 1;
                }
                if position <= PLACE_CUTOFF {
                    places += 1;
                }
                position_sum += position as u64;
                positioned += 1;
            }
        }

        let avg_position = if positioned > 0 {
            Some(round1(position_sum as f64 / positioned as f64))
        } else {
            None
        };

        Self {
            total_runs,
            wins,
            places,
            win_rate: percentage(wins, total_runs),
            place_rate: percentage(places, total_runs),
            avg_position,
        }
    }
}

fn percentage(count: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(count as f64 / total as f64 * 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// One runner's profile, statistics and the form lines behind them
#[derive(Debug, Clone, Serialize)]
pub struct RunnerStats {
    #[serde(flatten)]
    pub runner: Runner,
    pub stats: FormStats,
    pub form_lines: Vec<FormLine>,
}

/// Split form lines by runner, keeping each runner's lines in input order.
pub fn group_by_runner(lines: Vec<FormLine>) -> HashMap<i64, Vec<FormLine>> {
    let mut grouped: HashMap<i64, Vec<FormLine>> = HashMap::new();
    for line in lines {
        grouped.entry(line.runner_id).or_default().push(line);
    }
    grouped
}

/// Compute statistics for every runner in a race.
///
/// An unknown race yields an empty list rather than an error. Runners with
/// no matching form lines are still reported, with zeroed statistics.
pub fn compute_race_stats(
    store: &dyn RecordStore,
    race_id: Option<i64>,
    params: FormFilterParams,
) -> Result<Vec<RunnerStats>, QueryError> {
    let race_id = race_id.ok_or(QueryError::MissingParameter("race_id"))?;
    let filter = params.into_filter()?;

    let runners = store.runners_for_race(race_id)?;
    if runners.is_empty() {
        debug!(race_id, "No runners for race");
        return Ok(Vec::new());
    }

    let runner_ids = runners.iter().map(|r| r.id).collect();
    let query = build_form_query(FormScope::Runners(runner_ids), &filter);
    let lines = store.find_form_lines(&query)?;
    debug!(race_id, runners = runners.len(), lines = lines.len(), "Folding race stats");

    let mut grouped = group_by_runner(lines);
    let stats = runners
        .into_iter()
        .map(|runner| {
            let form_lines = grouped.remove(&runner.id).unwrap_or_default();
            RunnerStats {
                stats: FormStats::from_lines(&form_lines),
                runner,
                form_lines,
            }
        })
        .collect();

    Ok(stats)
}
