//! Shared data types for both event store backends
//!
//! This module contains types that are used by DuckDB and ClickHouse alike
//! so that ingestion, query parameters and results have one model.

mod enums;
mod events;
mod params;

pub use enums::Granularity;

// Re-export record types (ingestion and fixtures)
pub use events::{
    DistinctIdAssociation, Element, ElementRow, Event, IngestBatch, IngestSummary,
    StickinessCount,
};

// Re-export query parameter types
pub use params::{ElementAttribute, ElementPredicate, StickinessParams};
