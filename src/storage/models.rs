//! Race, runner and form-line records as read from the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use crate::query::{Field, FieldValue, Filterable};

/// Race meeting information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub id: i64,
    pub date: NaiveDate,
    pub course: String,
    pub race_time: Option<String>,
    pub race_name: Option<String>,
    pub distance: Option<String>,
    pub race_class: Option<String>,
    pub going: Option<String>,
    pub prize: Option<String>,
    pub age_restriction: Option<String>,
}

/// Individual runner in a race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runner {
    pub id: i64,
    pub race_id: i64,
    pub horse_name: String,
    pub age: Option<i64>,
    pub weight: Option<String>,
    pub draw: Option<i64>,
    pub jockey: Option<String>,
    pub trainer: Option<String>,
    pub official_rating: Option<i64>,
    /// Racing Post Rating
    pub rpr: Option<i64>,
    /// Top Speed
    pub ts: Option<i64>,
    pub odds: Option<String>,
    /// Compact form string, e.g. "1-32P4"
    pub form: Option<String>,
}

/// Past performance entry for a runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormLine {
    pub id: i64,
    pub runner_id: i64,
    pub race_date: Option<NaiveDate>,
    pub course: Option<String>,
    pub distance: Option<String>,
    pub going: Option<String>,
    pub race_class: Option<String>,
    /// Chase, Hurdle, NH Flat, Turf Flat, All Weather
    pub race_type: Option<String>,
    /// Hcp, Nvh, Md, ...
    pub race_code: Option<String>,
    pub surface: Option<String>,
    pub configuration: Option<String>,
    pub lh_rh: Option<String>,
    /// 1 = win, `None` when unplaced or unknown
    pub finishing_position: Option<u32>,
    pub beaten_distance: Option<String>,
    pub weight_carried: Option<String>,
    pub official_rating: Option<i64>,
    pub rpr: Option<i64>,
    pub jockey: Option<String>,
    pub odds: Option<String>,
    pub comment: Option<String>,
}

#[cfg(test)]
fn text(value: &Option<String>) -> Option<FieldValue> {
    value.as_ref().map(|v| FieldValue::Text(v.clone()))
}

#[cfg(test)]
impl Filterable for Race {
    fn field(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::Id => Some(FieldValue::Int(self.id)),
            Field::Date => Some(FieldValue::Date(self.date)),
            Field::Course => Some(FieldValue::Text(self.course.clone())),
            Field::RaceTime => text(&self.race_time),
            Field::Going => text(&self.going),
            Field::Distance => text(&self.distance),
            Field::RaceClass => text(&self.race_class),
            Field::RunnerId | Field::RaceDate | Field::FinishingPosition => None,
        }
    }
}

#[cfg(test)]
impl Filterable for FormLine {
    fn field(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::Id => Some(FieldValue::Int(self.id)),
            Field::RunnerId => Some(FieldValue::Int(self.runner_id)),
            Field::RaceDate => self.race_date.map(FieldValue::Date),
            Field::Course => text(&self.course),
            Field::Going => text(&self.going),
            Field::Distance => text(&self.distance),
            Field::RaceClass => text(&self.race_class),
            Field::FinishingPosition => self.finishing_position.map(|p| FieldValue::Int(p as i64)),
            Field::Date | Field::RaceTime => None,
        }
    }
}
