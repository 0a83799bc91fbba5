//! Filter predicate builder
//!
//! Turns optional race and form-line filters into a conjunctive query with a
//! deterministic ordering that any [`RecordStore`](crate::storage::RecordStore)
//! can execute.

pub mod filters;
pub mod predicate;

pub use filters::{FormFilter, FormFilterParams, RaceFilter, RaceFilterParams};
pub use predicate::{
    build_form_query, build_race_query, EntityKind, Field, FieldValue, FormScope, Op, Query,
};

#[cfg(test)]
pub use predicate::Filterable;
