//! Vec-backed store that evaluates queries in memory.

use anyhow::{ensure, Result};
use std::collections::BTreeSet;

use super::models::{FormLine, Race, Runner};
use super::RecordStore;
use crate::query::{EntityKind, Field, FieldValue, Filterable, Query};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    races: Vec<Race>,
    runners: Vec<Runner>,
    form_lines: Vec<FormLine>,
}

impl MemoryStore {
    pub fn new(races: Vec<Race>, runners: Vec<Runner>, form_lines: Vec<FormLine>) -> Self {
        Self {
            races,
            runners,
            form_lines,
        }
    }
}

fn select<R: Filterable + Clone>(records: &[R], query: &Query) -> Vec<R> {
    let mut matched: Vec<R> = records
        .iter()
        .filter(|r| query.matches(*r))
        .cloned()
        .collect();
    query.sort(&mut matched);
    matched
}

fn collect_text<R: Filterable>(records: &[R], field: Field, out: &mut BTreeSet<String>) {
    for record in records {
        if let Some(FieldValue::Text(value)) = record.field(field) {
            if !value.is_empty() {
                out.insert(value);
            }
        }
    }
}

impl RecordStore for MemoryStore {
    fn find_race(&self, id: i64) -> Result<Option<Race>> {
        Ok(self.races.iter().find(|r| r.id == id).cloned())
    }

    fn find_runner(&self, id: i64) -> Result<Option<Runner>> {
        Ok(self.runners.iter().find(|r| r.id == id).cloned())
    }

    fn find_races(&self, query: &Query) -> Result<Vec<Race>> {
        ensure!(query.entity == EntityKind::Race, "Expected a race query");
        Ok(select(&self.races, query))
    }

    fn runners_for_race(&self, race_id: i64) -> Result<Vec<Runner>> {
        let mut runners: Vec<Runner> = self
            .runners
            .iter()
            .filter(|r| r.race_id == race_id)
            .cloned()
            .collect();
        runners.sort_by_key(|r| r.id);
        Ok(runners)
    }

    fn find_form_lines(&self, query: &Query) -> Result<Vec<FormLine>> {
        ensure!(query.entity == EntityKind::FormLine, "Expected a form line query");
        Ok(select(&self.form_lines, query))
    }

    fn distinct_courses(&self) -> Result<Vec<String>> {
        let courses: BTreeSet<String> = self.races.iter().map(|r| r.course.clone()).collect();
        Ok(courses.into_iter().collect())
    }

    fn distinct_values(&self, entity: EntityKind, field: Field) -> Result<Vec<String>> {
        let mut values = BTreeSet::new();
        match entity {
            EntityKind::Race => collect_text(&self.races, field, &mut values),
            EntityKind::FormLine => collect_text(&self.form_lines, field, &mut values),
        }
        Ok(values.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{build_form_query, build_race_query, FormFilter, FormScope, RaceFilter};
    use crate::storage::fixtures::{seeded_memory_store, seeded_repository};

    /// Both stores must return the same records in the same order.
    #[test]
    fn test_memory_store_agrees_with_sqlite() {
        let memory = seeded_memory_store();
        let sqlite = seeded_repository();

        let race_filters = vec![
            RaceFilter::default(),
            RaceFilter {
                course: Some("Cheltenham".to_string()),
                ..Default::default()
            },
            RaceFilter {
                going: Some("Standard".to_string()),
                race_class: Some("Class 4".to_string()),
                ..Default::default()
            },
        ];
        for filter in &race_filters {
            let query = build_race_query(filter);
            assert_eq!(
                memory.find_races(&query).unwrap(),
                sqlite.find_races(&query).unwrap()
            );
        }

        let form_filters = vec![
            FormFilter::default(),
            FormFilter {
                going: Some("Good".to_string()),
                ..Default::default()
            },
            FormFilter {
                min_position: Some(2),
                max_position: Some(4),
                ..Default::default()
            },
        ];
        for filter in &form_filters {
            let query = build_form_query(FormScope::Runners(vec![10, 11, 12, 20]), filter);
            assert_eq!(
                memory.find_form_lines(&query).unwrap(),
                sqlite.find_form_lines(&query).unwrap()
            );
        }

        assert_eq!(
            memory.distinct_values(EntityKind::Race, Field::Going).unwrap(),
            sqlite.distinct_values(EntityKind::Race, Field::Going).unwrap()
        );
    }
}
