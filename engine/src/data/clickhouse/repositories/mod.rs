//! ClickHouse repositories

pub mod behavior;
pub mod ingest;
