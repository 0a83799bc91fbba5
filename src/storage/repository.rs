//! SQLite repository for race, runner and form-line reads

use anyhow::{anyhow, ensure, Context, Result};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::models::{FormLine, Race, Runner};
use super::schema::create_tables;
use super::RecordStore;
use crate::query::{EntityKind, Field, FieldValue, Op, Query};

const RACE_COLUMNS: &str = "id, date, course, race_time, race_name, distance, race_class, \
     going, prize, age_restriction";

const RUNNER_COLUMNS: &str = "id, race_id, horse_name, age, weight, draw, jockey, trainer, \
     official_rating, rpr, ts, odds, form";

const FORM_LINE_COLUMNS: &str = "id, runner_id, race_date, course, distance, going, race_class, \
     race_type, race_code, surface, configuration, lh_rh, finishing_position, beaten_distance, \
     weight_carried, official_rating, rpr, jockey, odds, comment";

/// Repository over the race card database
pub struct RaceRepository {
    conn: Mutex<Connection>,
}

impl RaceRepository {
    /// Open a repository, initializing the database if needed
    pub fn new(db_path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(db_path).context("Failed to open database")?;

        // Enable foreign keys
        conn.execute("PRAGMA foreign_keys = ON", [])?;

        // Create tables if they don't exist
        create_tables(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory repository (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        create_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow!("Failed to lock connection: {}", e))
    }

    // ==================== Fixture Inserts ====================

    #[cfg(test)]
    pub fn insert_race(&self, race: &Race) -> Result<()> {
        use rusqlite::params;
        self.conn()?.execute(
            &format!(
                "INSERT INTO races ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                RACE_COLUMNS
            ),
            params![
                race.id,
                race.date,
                race.course,
                race.race_time,
                race.race_name,
                race.distance,
                race.race_class,
                race.going,
                race.prize,
                race.age_restriction,
            ],
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub fn insert_runner(&self, runner: &Runner) -> Result<()> {
        use rusqlite::params;
        self.conn()?.execute(
            &format!(
                "INSERT INTO runners ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                RUNNER_COLUMNS
            ),
            params![
                runner.id,
                runner.race_id,
                runner.horse_name,
                runner.age,
                runner.weight,
                runner.draw,
                runner.jockey,
                runner.trainer,
                runner.official_rating,
                runner.rpr,
                runner.ts,
                runner.odds,
                runner.form,
            ],
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub fn insert_form_line(&self, line: &FormLine) -> Result<()> {
        use rusqlite::params;
        self.conn()?.execute(
            &format!(
                "INSERT INTO form_lines ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
                 ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
                FORM_LINE_COLUMNS
            ),
            params![
                line.id,
                line.runner_id,
                line.race_date,
                line.course,
                line.distance,
                line.going,
                line.race_class,
                line.race_type,
                line.race_code,
                line.surface,
                line.configuration,
                line.lh_rh,
                line.finishing_position,
                line.beaten_distance,
                line.weight_carried,
                line.official_rating,
                line.rpr,
                line.jockey,
                line.odds,
                line.comment,
            ],
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub fn delete_race(&self, race_id: i64) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM races WHERE id = ?1", [race_id])?;
        Ok(())
    }
}

/// Compile a query into a WHERE/ORDER BY tail and its bound parameters.
pub fn compile(query: &Query) -> (String, Vec<Value>) {
    let mut sql = String::new();
    let mut params = Vec::new();

    for (i, condition) in query.conditions.iter().enumerate() {
        sql.push_str(if i == 0 { " WHERE " } else { " AND " });
        let column = condition.field.column();

        match (condition.op, &condition.value) {
            (Op::In, FieldValue::List(ids)) if !ids.is_empty() => {
                let placeholders = vec!["?"; ids.len()].join(", ");
                sql.push_str(&format!("{} IN ({})", column, placeholders));
                params.extend(ids.iter().map(|id| Value::Integer(*id)));
            }
            // Empty scope or malformed IN matches nothing
            (Op::In, _) => sql.push_str("0 = 1"),
            (op, value) => {
                let operator = match op {
                    Op::Gte => ">=",
                    Op::Lte => "<=",
                    _ => "=",
                };
                sql.push_str(&format!("{} {} ?", column, operator));
                params.push(to_sql_value(value));
            }
        }
    }

    if !query.order.is_empty() {
        let keys: Vec<String> = query
            .order
            .iter()
            .map(|key| format!("{} {}", key.field.column(), key.direction.keyword()))
            .collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&keys.join(", "));
    }

    (sql, params)
}

fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Int(v) => Value::Integer(*v),
        FieldValue::Text(v) => Value::Text(v.clone()),
        FieldValue::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        FieldValue::List(_) => Value::Null,
    }
}

fn race_from_row(row: &Row<'_>) -> rusqlite::Result<Race> {
    Ok(Race {
        id: row.get(0)?,
        date: row.get(1)?,
        course: row.get(2)?,
        race_time: row.get(3)?,
        race_name: row.get(4)?,
        distance: row.get(5)?,
        race_class: row.get(6)?,
        going: row.get(7)?,
        prize: row.get(8)?,
        age_restriction: row.get(9)?,
    })
}

fn runner_from_row(row: &Row<'_>) -> rusqlite::Result<Runner> {
    Ok(Runner {
        id: row.get(0)?,
        race_id: row.get(1)?,
        horse_name: row.get(2)?,
        age: row.get(3)?,
        weight: row.get(4)?,
        draw: row.get(5)?,
        jockey: row.get(6)?,
        trainer: row.get(7)?,
        official_rating: row.get(8)?,
        rpr: row.get(9)?,
        ts: row.get(10)?,
        odds: row.get(11)?,
        form: row.get(12)?,
    })
}

fn form_line_from_row(row: &Row<'_>) -> rusqlite::Result<FormLine> {
    Ok(FormLine {
        id: row.get(0)?,
        runner_id: row.get(1)?,
        race_date: row.get(2)?,
        course: row.get(3)?,
        distance: row.get(4)?,
        going: row.get(5)?,
        race_class: row.get(6)?,
        race_type: row.get(7)?,
        race_code: row.get(8)?,
        surface: row.get(9)?,
        configuration: row.get(10)?,
        lh_rh: row.get(11)?,
        finishing_position: row.get(12)?,
        beaten_distance: row.get(13)?,
        weight_carried: row.get(14)?,
        official_rating: row.get(15)?,
        rpr: row.get(16)?,
        jockey: row.get(17)?,
        odds: row.get(18)?,
        comment: row.get(19)?,
    })
}

impl RecordStore for RaceRepository {
    fn find_race(&self, id: i64) -> Result<Option<Race>> {
        let race = self
            .conn()?
            .query_row(
                &format!("SELECT {} FROM races WHERE id = ?1", RACE_COLUMNS),
                [id],
                race_from_row,
            )
            .optional()?;
        Ok(race)
    }

    fn find_runner(&self, id: i64) -> Result<Option<Runner>> {
        let runner = self
            .conn()?
            .query_row(
                &format!("SELECT {} FROM runners WHERE id = ?1", RUNNER_COLUMNS),
                [id],
                runner_from_row,
            )
            .optional()?;
        Ok(runner)
    }

    fn find_races(&self, query: &Query) -> Result<Vec<Race>> {
        ensure!(
            query.entity == EntityKind::Race,
            "Expected a race query, got {:?}",
            query.entity
        );

        let (tail, params) = compile(query);
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM races{}", RACE_COLUMNS, tail))?;

        let races = stmt
            .query_map(params_from_iter(params.iter()), race_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(races)
    }

    fn runners_for_race(&self, race_id: i64) -> Result<Vec<Runner>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM runners WHERE race_id = ?1 ORDER BY id",
            RUNNER_COLUMNS
        ))?;

        let runners = stmt
            .query_map([race_id], runner_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(runners)
    }

    fn find_form_lines(&self, query: &Query) -> Result<Vec<FormLine>> {
        ensure!(
            query.entity == EntityKind::FormLine,
            "Expected a form line query, got {:?}",
            query.entity
        );

        let (tail, params) = compile(query);
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM form_lines{}",
            FORM_LINE_COLUMNS, tail
        ))?;

        let lines = stmt
            .query_map(params_from_iter(params.iter()), form_line_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(lines)
    }

    fn distinct_courses(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT DISTINCT course FROM races ORDER BY course")?;

        let courses = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(courses)
    }

    fn distinct_values(&self, entity: EntityKind, field: Field) -> Result<Vec<String>> {
        let column = field.column();
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT {col} FROM {table} WHERE {col} IS NOT NULL AND {col} != '' ORDER BY {col}",
            col = column,
            table = entity.table(),
        ))?;

        let values = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{build_form_query, build_race_query, FormFilter, FormScope, RaceFilter};
    use crate::storage::fixtures::{form_line, race, runner, seeded_repository};
    use chrono::NaiveDate;

    #[test]
    fn test_insert_and_find_race() {
        let repo = RaceRepository::in_memory().unwrap();
        let r = race(1, "2024-03-12", "Cheltenham");
        repo.insert_race(&r).unwrap();

        assert_eq!(repo.find_race(1).unwrap(), Some(r));
        assert_eq!(repo.find_race(2).unwrap(), None);
    }

    #[test]
    fn test_compile_empty_query() {
        let query = build_race_query(&RaceFilter::default());
        let (sql, params) = compile(&query);
        assert_eq!(sql, " ORDER BY date DESC, race_time ASC, id ASC");
        assert!(params.is_empty());
    }

    #[test]
    fn test_compile_conditions_in_order() {
        let filter = FormFilter {
            going: Some("Soft".to_string()),
            min_position: Some(1),
            max_position: Some(3),
            ..Default::default()
        };
        let query = build_form_query(FormScope::Runners(vec![4, 5]), &filter);
        let (sql, params) = compile(&query);

        assert_eq!(
            sql,
            " WHERE runner_id IN (?, ?) AND going = ? AND finishing_position >= ? \
             AND finishing_position <= ? ORDER BY race_date DESC, id ASC"
        );
        assert_eq!(
            params,
            vec![
                Value::Integer(4),
                Value::Integer(5),
                Value::Text("Soft".to_string()),
                Value::Integer(1),
                Value::Integer(3),
            ]
        );
    }

    #[test]
    fn test_compile_empty_scope_matches_nothing() {
        let query = build_form_query(FormScope::Runners(vec![]), &FormFilter::default());
        let (sql, params) = compile(&query);
        assert!(sql.starts_with(" WHERE 0 = 1"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_find_races_by_date() {
        let repo = seeded_repository();
        let filter = RaceFilter {
            date: NaiveDate::from_ymd_opt(2024, 3, 12),
            ..Default::default()
        };
        let races = repo.find_races(&build_race_query(&filter)).unwrap();

        assert_eq!(races.len(), 2);
        assert!(races.iter().all(|r| r.date.to_string() == "2024-03-12"));
        // Same date, race time ascending
        assert_eq!(races[0].race_time.as_deref(), Some("13:30"));
        assert_eq!(races[1].race_time.as_deref(), Some("14:10"));
    }

    #[test]
    fn test_find_races_rejects_form_query() {
        let repo = RaceRepository::in_memory().unwrap();
        let query = build_form_query(FormScope::Runner(1), &FormFilter::default());
        assert!(repo.find_races(&query).is_err());
    }

    #[test]
    fn test_find_form_lines_most_recent_first() {
        let repo = seeded_repository();
        let query = build_form_query(FormScope::Runner(11), &FormFilter::default());
        let lines = repo.find_form_lines(&query).unwrap();

        let dates: Vec<_> = lines
            .iter()
            .map(|l| l.race_date.unwrap().to_string())
            .collect();
        assert_eq!(dates, vec!["2024-06-15", "2023-01-01", "2022-11-30"]);
    }

    #[test]
    fn test_runners_for_unknown_race_is_empty() {
        let repo = seeded_repository();
        assert!(repo.runners_for_race(999).unwrap().is_empty());
    }

    #[test]
    fn test_delete_race_cascades() {
        let repo = RaceRepository::in_memory().unwrap();
        repo.insert_race(&race(1, "2024-01-01", "Ascot")).unwrap();
        repo.insert_runner(&runner(1, 1, "Frankel")).unwrap();
        repo.insert_form_line(&form_line(1, 1, "2023-06-01", Some(1)))
            .unwrap();

        repo.delete_race(1).unwrap();

        assert!(repo.find_runner(1).unwrap().is_none());
        let query = build_form_query(FormScope::Runner(1), &FormFilter::default());
        assert!(repo.find_form_lines(&query).unwrap().is_empty());
    }

    #[test]
    fn test_runner_requires_existing_race() {
        let repo = RaceRepository::in_memory().unwrap();
        assert!(repo.insert_runner(&runner(1, 42, "Orphan")).is_err());
    }

    #[test]
    fn test_distinct_values_skip_null_and_empty() {
        let repo = seeded_repository();
        let goings = repo
            .distinct_values(EntityKind::FormLine, Field::Going)
            .unwrap();
        assert_eq!(goings, vec!["Good", "Heavy", "Soft"]);

        let courses = repo.distinct_courses().unwrap();
        assert_eq!(courses, vec!["Cheltenham", "Kempton"]);
    }
}
