//! Query error type

use thiserror::Error;

use crate::data::DataError;
use crate::data::filters::FilterError;

/// Error returned by every query entry point
#[derive(Error, Debug)]
pub enum QueryError {
    /// Missing or invalid team scope. Queries never run unscoped.
    #[error("Invalid team scope: {0}")]
    Scope(String),

    /// Malformed query parameters
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// Failure in the event store
    #[error(transparent)]
    Data(#[from] DataError),
}

impl QueryError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<FilterError> for QueryError {
    fn from(err: FilterError) -> Self {
        Self::validation("filters", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = QueryError::validation("date_to", "must not precede date_from");
        assert_eq!(err.to_string(), "Invalid date_to: must not precede date_from");
    }

    #[test]
    fn test_filter_error_becomes_validation() {
        let err: QueryError = FilterError::TooMany { max: 50 }.into();
        assert!(matches!(err, QueryError::Validation { field: "filters", .. }));
    }

    #[test]
    fn test_data_error_is_transparent() {
        let err: QueryError = DataError::Config("missing url".to_string()).into();
        assert_eq!(err.to_string(), "Configuration error: missing url");
    }
}
