//! Event filter system
//!
//! Provides the event-name and property predicates that restrict which events
//! enter an aggregation, and their SQL generation for both dialects.
//!
//! ## Usage
//!
//! ```no_run
//! use clickpath_engine::data::filters::{EntityFilter, parse_filters};
//!
//! let json_str = r#"[{"type": "string", "key": "$browser", "operator": "=", "value": "Chrome"}]"#;
//! let filter = EntityFilter {
//!     event: Some("$pageview".to_string()),
//!     properties: parse_filters(json_str).unwrap(),
//! };
//! ```

mod parser;
mod types;

pub use parser::parse_filters;
pub use types::{EntityFilter, NullOp, NumberOp, OptionsOp, PropertyFilter, StringOp};

use thiserror::Error;

/// Invalid filter input
#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Filter JSON exceeds maximum size of {max_bytes} bytes")]
    TooLarge { max_bytes: usize },

    #[error("Maximum {max} property filters allowed")]
    TooMany { max: usize },

    #[error("Invalid filter JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid property key: '{0}'")]
    InvalidKey(String),

    #[error("Invalid filter value: {0}")]
    InvalidValue(String),
}
