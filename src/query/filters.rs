//! Filter parameters as received from callers, and their validated form.
//!
//! Every filter is optional. An absent (or empty) value never restricts the
//! result; a present value that cannot be parsed is rejected up front.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::QueryError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw race filters, e.g. from a query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RaceFilterParams {
    pub date: Option<String>,
    pub course: Option<String>,
    pub going: Option<String>,
    pub distance: Option<String>,
    #[serde(alias = "class")]
    pub race_class: Option<String>,
    pub race_time: Option<String>,
}

/// Raw form-line filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormFilterParams {
    pub date: Option<String>,
    pub course: Option<String>,
    pub going: Option<String>,
    pub distance: Option<String>,
    #[serde(alias = "class")]
    pub race_class: Option<String>,
    pub min_position: Option<String>,
    pub max_position: Option<String>,
}

/// Validated race filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaceFilter {
    pub date: Option<NaiveDate>,
    pub course: Option<String>,
    pub going: Option<String>,
    pub distance: Option<String>,
    pub race_class: Option<String>,
    pub race_time: Option<String>,
}

/// Validated form-line filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFilter {
    pub date: Option<NaiveDate>,
    pub course: Option<String>,
    pub going: Option<String>,
    pub distance: Option<String>,
    pub race_class: Option<String>,
    /// Inclusive lower bound on finishing position
    pub min_position: Option<u32>,
    /// Inclusive upper bound on finishing position
    pub max_position: Option<u32>,
}

impl RaceFilterParams {
    pub fn into_filter(self) -> Result<RaceFilter, QueryError> {
        Ok(RaceFilter {
            date: parse_date("date", self.date)?,
            course: present(self.course),
            going: present(self.going),
            distance: present(self.distance),
            race_class: present(self.race_class),
            race_time: present(self.race_time),
        })
    }
}

impl FormFilterParams {
    pub fn into_filter(self) -> Result<FormFilter, QueryError> {
        Ok(FormFilter {
            date: parse_date("date", self.date)?,
            course: present(self.course),
            going: present(self.going),
            distance: present(self.distance),
            race_class: present(self.race_class),
            min_position: parse_position("min_position", self.min_position)?,
            max_position: parse_position("max_position", self.max_position)?,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Parse a `YYYY-MM-DD` date. Empty counts as absent.
pub fn parse_date(field: &'static str, value: Option<String>) -> Result<Option<NaiveDate>, QueryError> {
    match present(value) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| QueryError::invalid(field, raw, "YYYY-MM-DD")),
    }
}

/// Parse a finishing-position bound. Zero is treated as "no bound".
fn parse_position(field: &'static str, value: Option<String>) -> Result<Option<u32>, QueryError> {
    match present(value) {
        None => Ok(None),
        Some(raw) => match raw.parse::<u32>() {
            Ok(0) => Ok(None),
            Ok(position) => Ok(Some(position)),
            Err(_) => Err(QueryError::invalid(field, raw, "a non-negative integer")),
        },
    }
}
