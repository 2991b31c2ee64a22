//! SQL abstraction layer for multi-database support
//!
//! This module provides abstractions for generating SQL that works on both
//! event store backends (DuckDB, ClickHouse).

mod clickhouse_dialect;
mod dialect;
mod duckdb_dialect;

pub use clickhouse_dialect::ClickhouseDialect;
pub use dialect::SqlDialect;
pub use duckdb_dialect::DuckdbDialect;
