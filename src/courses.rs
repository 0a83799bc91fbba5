//! Racecourse characteristics lookup.
//!
//! Maps a course name to its surface, configuration and handedness. The
//! built-in table covers UK and Irish courses; an alternative JSON table can
//! be supplied through configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::storage::Race;

/// Built-in UK and Irish course table
const BUILTIN_COURSES: &str = include_str!("../data/courses.json");

/// Physical descriptors of a racecourse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseCharacteristics {
    pub surface: String,
    pub configuration: String,
    /// Left Handed, Right Handed, Other
    pub lh_rh: String,
}

/// Source of course characteristics
pub trait CourseLookup: Send + Sync {
    fn lookup(&self, course: &str) -> Option<&CourseCharacteristics>;
}

/// In-memory course table
#[derive(Debug, Clone, Default)]
pub struct CourseTable {
    courses: HashMap<String, CourseCharacteristics>,
}

impl CourseTable {
    /// Table shipped with the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_COURSES).context("Failed to parse built-in course table")
    }

    /// Parse a `{ "Course": { "surface", "configuration", "lh_rh" } }` object
    pub fn from_json(json: &str) -> Result<Self> {
        let courses: HashMap<String, CourseCharacteristics> = serde_json::from_str(json)?;
        Ok(Self { courses })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read course table {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse course table {}", path.display()))
    }

    /// Load the configured table, falling back to the built-in one
    pub fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            return Self::builtin();
        };

        match Self::from_file(path) {
            Ok(table) if table.is_empty() => {
                warn!("Course table {} is empty, using built-in course table", path);
                Self::builtin()
            }
            Ok(table) => {
                info!("Loaded course table: {} courses from {}", table.len(), path);
                Ok(table)
            }
            Err(e) => {
                warn!("{:#}, using built-in course table", e);
                Self::builtin()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

impl CourseLookup for CourseTable {
    fn lookup(&self, course: &str) -> Option<&CourseCharacteristics> {
        self.courses.get(course)
    }
}

/// Race with its course characteristics merged in, when the course is known
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedRace {
    #[serde(flatten)]
    pub race: Race,
    #[serde(flatten)]
    pub characteristics: Option<CourseCharacteristics>,
}

pub fn enrich(race: Race, lookup: &dyn CourseLookup) -> EnrichedRace {
    let characteristics = lookup.lookup(&race.course).cloned();
    EnrichedRace {
        race,
        characteristics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixtures::race;

    #[test]
    fn test_builtin_table() {
        let table = CourseTable::builtin().unwrap();
        assert_eq!(table.len(), 93);

        let cheltenham = table.lookup("Cheltenham").unwrap();
        assert_eq!(cheltenham.surface, "Severe Undulations");
        assert_eq!(cheltenham.configuration, "Galloping - Uphill Finish");
        assert_eq!(cheltenham.lh_rh, "Left Handed");

        let ascot = table.lookup("Ascot").unwrap();
        assert_eq!(ascot.lh_rh, "Right Handed");
    }

    #[test]
    fn test_unknown_course() {
        let table = CourseTable::builtin().unwrap();
        assert!(table.lookup("Meydan").is_none());
        // Exact match only
        assert!(table.lookup("cheltenham").is_none());
    }

    #[test]
    fn test_custom_table_replaces_builtin() {
        let table = CourseTable::from_json(
            r#"{"Meydan": {"surface": "Flat", "configuration": "Galloping", "lh_rh": "Left Handed"}}"#,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.lookup("Meydan").is_some());
        assert!(table.lookup("Cheltenham").is_none());
    }

    #[test]
    fn test_load_falls_back_on_missing_file() {
        let table = CourseTable::load(Some("does/not/exist.json")).unwrap();
        assert_eq!(table.len(), 93);
    }

    #[test]
    fn test_load_configured_file() {
        let path = std::env::temp_dir().join(format!("courses-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"Meydan": {"surface": "Flat", "configuration": "Galloping", "lh_rh": "Left Handed"}}"#,
        )
        .unwrap();

        let table = CourseTable::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(table.len(), 1);
        assert!(table.lookup("Meydan").is_some());
    }

    #[test]
    fn test_load_empty_file_falls_back() {
        let path = std::env::temp_dir().join(format!("courses-empty-{}.json", std::process::id()));
        std::fs::write(&path, "{}").unwrap();

        let table = CourseTable::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(!table.is_empty());
        assert_eq!(table.len(), 93);
    }

    #[test]
    fn test_enrich_merges_characteristics() {
        let table = CourseTable::builtin().unwrap();

        let json = serde_json::to_value(enrich(race(1, "2024-03-12", "Cheltenham"), &table)).unwrap();
        assert_eq!(json["course"], "Cheltenham");
        assert_eq!(json["lh_rh"], "Left Handed");
        assert_eq!(json["surface"], "Severe Undulations");

        let json = serde_json::to_value(enrich(race(2, "2024-03-12", "Meydan"), &table)).unwrap();
        assert_eq!(json["course"], "Meydan");
        assert!(json.get("lh_rh").is_none());
    }
}
