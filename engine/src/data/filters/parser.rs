//! Filter parsing
//!
//! Parses JSON property filter definitions with size and count limits.

use super::FilterError;
use super::types::PropertyFilter;
use crate::core::constants::{MAX_FILTER_JSON_SIZE, MAX_PROPERTY_FILTERS};

/// Parse property filters from a JSON array
///
/// Validates JSON size, parses into PropertyFilter values, and validates keys.
pub fn parse_filters(json_str: &str) -> Result<Vec<PropertyFilter>, FilterError> {
    if json_str.len() > MAX_FILTER_JSON_SIZE {
        return Err(FilterError::TooLarge {
            max_bytes: MAX_FILTER_JSON_SIZE,
        });
    }

    let filters: Vec<PropertyFilter> =
        serde_json::from_str(json_str).map_err(|e| FilterError::InvalidJson(e.to_string()))?;

    if filters.len() > MAX_PROPERTY_FILTERS {
        return Err(FilterError::TooMany {
            max: MAX_PROPERTY_FILTERS,
        });
    }

    for filter in &filters {
        filter.validate()?;
    }

    Ok(filters)
}
