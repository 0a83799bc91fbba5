//! Request and response types for the racing form API.

use serde::{Deserialize, Serialize};

use crate::courses::{CourseCharacteristics, EnrichedRace};
use crate::query::FormFilterParams;
use crate::stats::RunnerStats;
use crate::storage::{FormLine, Race, Runner};

/// Runner with its full form history
#[derive(Debug, Clone, Serialize)]
pub struct RunnerCard {
    #[serde(flatten)]
    pub runner: Runner,
    pub form_lines: Vec<FormLine>,
}

/// Race with runners, no form
#[derive(Debug, Clone, Serialize)]
pub struct RaceCard {
    pub race: Race,
    pub runners: Vec<Runner>,
}

/// Course name with characteristics, if known
#[derive(Debug, Clone, Serialize)]
pub struct CourseEntry {
    pub name: String,
    pub characteristics: Option<CourseCharacteristics>,
}

/// Distinct values available for filtering
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
    pub goings: Vec<String>,
    pub distances: Vec<String>,
    pub classes: Vec<String>,
}

/// Query parameters for race cards
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RacecardParams {
    pub date: Option<String>,
    pub course: Option<String>,
}

/// Query parameters for race statistics: the race id plus form-line filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsParams {
    pub race_id: Option<String>,
    #[serde(flatten)]
    pub filters: FormFilterParams,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct RacesResponse {
    pub count: usize,
    pub races: Vec<Race>,
}

#[derive(Debug, Serialize)]
pub struct RaceDetailResponse {
    pub race: EnrichedRace,
    pub runners: Vec<RunnerCard>,
}

#[derive(Debug, Serialize)]
pub struct RunnerFormResponse {
    pub runner: Runner,
    pub form: Vec<FormLine>,
}

#[derive(Debug, Serialize)]
pub struct CoursesResponse {
    pub count: usize,
    pub courses: Vec<CourseEntry>,
}

#[derive(Debug, Serialize)]
pub struct RacecardsResponse {
    pub date: String,
    pub course: Option<String>,
    pub count: usize,
    pub racecards: Vec<RaceCard>,
}

#[derive(Debug, Serialize)]
pub struct RaceStatsResponse {
    pub race_id: i64,
    pub count: usize,
    pub runners: Vec<RunnerStats>,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
