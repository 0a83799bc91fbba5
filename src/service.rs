//! Read operations shared by the HTTP routes and the CLI.
//!
//! Each operation validates its filters completely before touching the
//! store, so a bad value never results in a partial query.

use std::collections::BTreeSet;
use tracing::debug;

use crate::courses::{enrich, CourseLookup};
use crate::error::QueryError;
use crate::query::filters::parse_date;
use crate::query::{
    build_form_query, build_race_query, EntityKind, Field, FormFilter, FormFilterParams,
    FormScope, RaceFilter, RaceFilterParams,
};
use crate::stats::group_by_runner;
use crate::storage::{Race, RecordStore};
use crate::types::{
    CourseEntry, FilterOptions, RaceCard, RaceDetailResponse, RacecardParams, RacecardsResponse,
    RunnerCard, RunnerFormResponse,
};

/// Races matching the filters, latest first.
pub fn list_races(
    store: &dyn RecordStore,
    params: RaceFilterParams,
) -> Result<Vec<Race>, QueryError> {
    let filter = params.into_filter()?;
    let query = build_race_query(&filter);
    debug!(conditions = query.conditions.len(), "Listing races");
    Ok(store.find_races(&query)?)
}

/// Full race card: race, runners and every runner's form history.
///
/// Returns `None` when the race does not exist.
pub fn race_detail(
    store: &dyn RecordStore,
    courses: &dyn CourseLookup,
    race_id: i64,
) -> Result<Option<RaceDetailResponse>, QueryError> {
    let Some(race) = store.find_race(race_id)? else {
        return Ok(None);
    };

    let runners = store.runners_for_race(race_id)?;
    let runner_ids = runners.iter().map(|r| r.id).collect();
    let query = build_form_query(FormScope::Runners(runner_ids), &FormFilter::default());
    let mut grouped = group_by_runner(store.find_form_lines(&query)?);

    let runners = runners
        .into_iter()
        .map(|runner| RunnerCard {
            form_lines: grouped.remove(&runner.id).unwrap_or_default(),
            runner,
        })
        .collect();

    Ok(Some(RaceDetailResponse {
        race: enrich(race, courses),
        runners,
    }))
}

/// A runner's form history restricted by the filters, most recent first.
///
/// Returns `None` when the runner does not exist.
pub fn runner_form(
    store: &dyn RecordStore,
    runner_id: i64,
    params: FormFilterParams,
) -> Result<Option<RunnerFormResponse>, QueryError> {
    let filter = params.into_filter()?;

    let Some(runner) = store.find_runner(runner_id)? else {
        return Ok(None);
    };

    let query = build_form_query(FormScope::Runner(runner_id), &filter);
    let form = store.find_form_lines(&query)?;
    debug!(runner_id, lines = form.len(), "Fetched runner form");

    Ok(Some(RunnerFormResponse { runner, form }))
}

/// Race cards (races plus runners) for one date, optionally one course.
pub fn racecards(
    store: &dyn RecordStore,
    params: RacecardParams,
) -> Result<RacecardsResponse, QueryError> {
    let date = parse_date("date", params.date)?.ok_or(QueryError::MissingParameter("date"))?;
    let course = params.course.filter(|c| !c.is_empty());

    let filter = RaceFilter {
        date: Some(date),
        course: course.clone(),
        ..Default::default()
    };
    let races = store.find_races(&build_race_query(&filter))?;

    let mut racecards = Vec::with_capacity(races.len());
    for race in races {
        let runners = store.runners_for_race(race.id)?;
        racecards.push(RaceCard { race, runners });
    }

    Ok(RacecardsResponse {
        date: date.to_string(),
        course,
        count: racecards.len(),
        racecards,
    })
}

/// Every course in the store with its characteristics, if known.
pub fn course_listing(
    store: &dyn RecordStore,
    courses: &dyn CourseLookup,
) -> Result<Vec<CourseEntry>, QueryError> {
    let entries = store
        .distinct_courses()?
        .into_iter()
        .map(|name| CourseEntry {
            characteristics: courses.lookup(&name).cloned(),
            name,
        })
        .collect();
    Ok(entries)
}

/// Goings, distances and classes seen in races or form lines.
pub fn filter_options(store: &dyn RecordStore) -> Result<FilterOptions, QueryError> {
    let union = |field: Field| -> Result<Vec<String>, QueryError> {
        let mut values: BTreeSet<String> = store
            .distinct_values(EntityKind::Race, field)?
            .into_iter()
            .collect();
        values.extend(store.distinct_values(EntityKind::FormLine, field)?);
        Ok(values.into_iter().collect())
    };

    Ok(FilterOptions {
        goings: union(Field::Going)?,
        distances: union(Field::Distance)?,
        classes: union(Field::RaceClass)?,
    })
}

/// Parse an optional race id from a query string. Empty counts as absent.
pub fn parse_race_id(raw: Option<String>) -> Result<Option<i64>, QueryError> {
    match raw.filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| QueryError::invalid("race_id", raw, "an integer")),
    }
}
