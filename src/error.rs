//! Error taxonomy for the query and statistics layer.

use thiserror::Error;

/// Errors raised while resolving filters or computing statistics.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A filter value could not be parsed into its expected type.
    #[error("Invalid {field} value '{value}': expected {expected}")]
    InvalidFilterValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A mandatory scope key was not supplied.
    #[error("{0} parameter is required")]
    MissingParameter(&'static str),

    /// The backing store failed. Never recovered from here.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] anyhow::Error),
}

impl QueryError {
    pub fn invalid(field: &'static str, value: impl Into<String>, expected: &'static str) -> Self {
        QueryError::InvalidFilterValue {
            field,
            value: value.into(),
            expected,
        }
    }

    /// Whether the caller supplied bad input (as opposed to a store fault).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, QueryError::StoreUnavailable(_))
    }
}
