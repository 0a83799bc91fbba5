//! Read-side storage for race cards
//!
//! The core only ever reads: races, their runners, and each runner's form
//! lines are written by an external import process.

#[cfg(test)]
pub mod fixtures;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod repository;
pub mod schema;

use anyhow::Result;

use crate::query::{EntityKind, Field, Query};

pub use models::{FormLine, Race, Runner};
pub use repository::RaceRepository;

/// Capabilities the query layer needs from a backing store.
pub trait RecordStore: Send + Sync {
    fn find_race(&self, id: i64) -> Result<Option<Race>>;

    fn find_runner(&self, id: i64) -> Result<Option<Runner>>;

    /// Races matching `query`, in the query's order.
    fn find_races(&self, query: &Query) -> Result<Vec<Race>>;

    /// Every runner of a race, by id. Unknown races have no runners.
    fn runners_for_race(&self, race_id: i64) -> Result<Vec<Runner>>;

    /// Form lines matching `query`, in the query's order.
    fn find_form_lines(&self, query: &Query) -> Result<Vec<FormLine>>;

    /// Distinct course names across all races, sorted.
    fn distinct_courses(&self) -> Result<Vec<String>>;

    /// Distinct non-empty text values of `field`, sorted.
    fn distinct_values(&self, entity: EntityKind, field: Field) -> Result<Vec<String>>;
}
