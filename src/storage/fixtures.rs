//! Shared record builders and a seeded data set for tests.

use chrono::NaiveDate;

use super::memory::MemoryStore;
use super::models::{FormLine, Race, Runner};
use super::repository::RaceRepository;

pub fn race(id: i64, date: &str, course: &str) -> Race {
    Race {
        id,
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        course: course.to_string(),
        race_time: None,
        race_name: None,
        distance: None,
        race_class: None,
        going: None,
        prize: None,
        age_restriction: None,
    }
}

pub fn runner(id: i64, race_id: i64, horse_name: &str) -> Runner {
    Runner {
        id,
        race_id,
        horse_name: horse_name.to_string(),
        age: None,
        weight: None,
        draw: None,
        jockey: None,
        trainer: None,
        official_rating: None,
        rpr: None,
        ts: None,
        odds: None,
        form: None,
    }
}

pub fn form_line(id: i64, runner_id: i64, race_date: &str, position: Option<u32>) -> FormLine {
    FormLine {
        id,
        runner_id,
        race_date: Some(NaiveDate::parse_from_str(race_date, "%Y-%m-%d").unwrap()),
        course: None,
        distance: None,
        going: None,
        race_class: None,
        race_type: None,
        race_code: None,
        surface: None,
        configuration: None,
        lh_rh: None,
        finishing_position: position,
        beaten_distance: None,
        weight_carried: None,
        official_rating: None,
        rpr: None,
        jockey: None,
        odds: None,
        comment: None,
    }
}

fn race_with(
    id: i64,
    date: &str,
    course: &str,
    time: &str,
    distance: &str,
    class: &str,
    going: &str,
) -> Race {
    Race {
        race_time: Some(time.to_string()),
        distance: Some(distance.to_string()),
        race_class: Some(class.to_string()),
        going: Some(going.to_string()),
        ..race(id, date, course)
    }
}

#[allow(clippy::too_many_arguments)]
fn line_with(
    id: i64,
    runner_id: i64,
    date: &str,
    course: &str,
    distance: &str,
    going: &str,
    class: &str,
    position: Option<u32>,
) -> FormLine {
    FormLine {
        course: Some(course.to_string()),
        distance: Some(distance.to_string()),
        going: Some(going.to_string()),
        race_class: Some(class.to_string()),
        ..form_line(id, runner_id, date, position)
    }
}

/// Three races, five runners and eight form lines.
///
/// - race 1 (Cheltenham 2024-03-12 13:30): runners 10, 11, 12
/// - race 2 (Cheltenham 2024-03-12 14:10): runner 20
/// - race 3 (Kempton 2024-02-01 19:00): runner 30
/// - runner 10 finished `[1, 2, 4, 1]`; runner 12 and 30 have no form
pub fn seed_records() -> (Vec<Race>, Vec<Runner>, Vec<FormLine>) {
    let races = vec![
        race_with(1, "2024-03-12", "Cheltenham", "13:30", "2m", "Grade 1", "Good"),
        race_with(2, "2024-03-12", "Cheltenham", "14:10", "3m2f", "Grade 1", "Soft"),
        race_with(3, "2024-02-01", "Kempton", "19:00", "1m", "Class 4", "Standard"),
    ];

    let runners = vec![
        runner(10, 1, "Constitution Hill"),
        runner(11, 1, "State Man"),
        runner(12, 1, "Lossiemouth"),
        runner(20, 2, "Galopin Des Champs"),
        runner(30, 3, "Kempton Debutant"),
    ];

    let form_lines = vec![
        line_with(100, 10, "2024-01-20", "Cheltenham", "2m", "Good", "Grade 1", Some(1)),
        line_with(101, 10, "2023-12-26", "Kempton", "2m", "Soft", "Grade 1", Some(2)),
        line_with(102, 10, "2023-04-25", "Punchestown", "2m", "Heavy", "Grade 1", Some(4)),
        line_with(103, 10, "2023-03-14", "Cheltenham", "2m", "Good", "Grade 1", Some(1)),
        line_with(110, 11, "2023-01-01", "Kempton", "2m", "Soft", "Grade 2", Some(3)),
        line_with(111, 11, "2024-06-15", "Cheltenham", "2m4f", "Good", "Grade 1", None),
        line_with(112, 11, "2022-11-30", "Newbury", "2m", "Good", "Class 2", Some(5)),
        line_with(200, 20, "2024-01-01", "Leopardstown", "3m", "Soft", "Grade 1", Some(1)),
    ];

    (races, runners, form_lines)
}

pub fn seeded_repository() -> RaceRepository {
    let repo = RaceRepository::in_memory().unwrap();
    let (races, runners, form_lines) = seed_records();
    for r in &races {
        repo.insert_race(r).unwrap();
    }
    for r in &runners {
        repo.insert_runner(r).unwrap();
    }
    for l in &form_lines {
        repo.insert_form_line(l).unwrap();
    }
    repo
}

pub fn seeded_memory_store() -> MemoryStore {
    let (races, runners, form_lines) = seed_records();
    MemoryStore::new(races, runners, form_lines)
}
