//! SQLite schema definitions for race card data
//!
//! Tables:
//! - races: Race meeting information
//! - runners: Horses entered in a race
//! - form_lines: Past performances for each runner

use rusqlite::{Connection, Result};

/// Create all tables in the database
pub fn create_tables(conn: &Connection) -> Result<()> {
    // Race meetings
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS races (
            id INTEGER PRIMARY KEY,
            date TEXT NOT NULL,
            course TEXT NOT NULL,
            race_time TEXT,
            race_name TEXT,
            distance TEXT,
            race_class TEXT,
            going TEXT,
            prize TEXT,
            age_restriction TEXT
        )
        "#,
        [],
    )?;

    // Runners, removed with their race
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS runners (
            id INTEGER PRIMARY KEY,
            race_id INTEGER NOT NULL REFERENCES races(id) ON DELETE CASCADE,
            horse_name TEXT NOT NULL,
            age INTEGER,
            weight TEXT,
            draw INTEGER,
            jockey TEXT,
            trainer TEXT,
            official_rating INTEGER,
            rpr INTEGER,
            ts INTEGER,
            odds TEXT,
            form TEXT
        )
        "#,
        [],
    )?;

    // Past performances, removed with their runner
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS form_lines (
            id INTEGER PRIMARY KEY,
            runner_id INTEGER NOT NULL REFERENCES runners(id) ON DELETE CASCADE,
            race_date TEXT,
            course TEXT,
            distance TEXT,
            going TEXT,
            race_class TEXT,
            race_type TEXT,
            race_code TEXT,
            surface TEXT,
            configuration TEXT,
            lh_rh TEXT,
            finishing_position INTEGER
                CHECK (finishing_position IS NULL OR finishing_position > 0),
            beaten_distance TEXT,
            weight_carried TEXT,
            official_rating INTEGER,
            rpr INTEGER,
            jockey TEXT,
            odds TEXT,
            comment TEXT
        )
        "#,
        [],
    )?;

    // Indexes for the filterable columns
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_races_date ON races(date)",
        "CREATE INDEX IF NOT EXISTS idx_races_course ON races(course)",
        "CREATE INDEX IF NOT EXISTS idx_races_going ON races(going)",
        "CREATE INDEX IF NOT EXISTS idx_runners_race ON runners(race_id)",
        "CREATE INDEX IF NOT EXISTS idx_runners_horse ON runners(horse_name)",
        "CREATE INDEX IF NOT EXISTS idx_form_lines_runner ON form_lines(runner_id)",
        "CREATE INDEX IF NOT EXISTS idx_form_lines_date ON form_lines(race_date)",
        "CREATE INDEX IF NOT EXISTS idx_form_lines_going ON form_lines(going)",
        "CREATE INDEX IF NOT EXISTS idx_form_lines_distance ON form_lines(distance)",
        "CREATE INDEX IF NOT EXISTS idx_form_lines_class ON form_lines(race_class)",
        "CREATE INDEX IF NOT EXISTS idx_form_lines_position ON form_lines(finishing_position)",
    ];
    for sql in indexes {
        conn.execute(sql, [])?;
    }

    Ok(())
}
