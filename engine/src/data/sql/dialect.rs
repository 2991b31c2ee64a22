//! SQL dialect trait for multi-database support
//!
//! This trait defines the interface for generating database-specific SQL syntax.
//! Every fragment uses `?` placeholders; values are always bound, never inlined.

use crate::data::types::Granularity;

/// SQL dialect trait for generating database-specific SQL
///
/// The backends differ in:
/// - Timestamp construction from bound parameters
/// - Calendar bucket truncation
/// - JSON property extraction
/// - Array membership
/// - Correlated subquery support
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Expression turning one bound i64 (microseconds since epoch) into a timestamp
    ///
    /// - DuckDB: `make_timestamp(?)`
    /// - ClickHouse: `fromUnixTimestamp64Micro(?)`
    fn timestamp_param(&self) -> &'static str;

    /// Convert timestamp column to microseconds since epoch
    ///
    /// - DuckDB: `epoch_us(col)`
    /// - ClickHouse: `toInt64(toUnixTimestamp64Micro(col))`
    fn timestamp_to_micros(&self, col: &str) -> String;

    /// Truncate a timestamp column to the start of its UTC bucket
    ///
    /// - DuckDB: `date_trunc('week', col)` (ISO weeks start Monday)
    /// - ClickHouse: `toStartOfWeek(col, 1)` (mode 1 = Monday)
    fn truncate_to_bucket(&self, col: &str, granularity: Granularity) -> String;

    /// Check if an array column contains one bound value
    ///
    /// - DuckDB: `list_contains(col, ?)`
    /// - ClickHouse: `has(col, ?)`
    fn array_contains(&self, array_col: &str) -> String;

    /// Bound JSON path parameter addressing the top-level member `key`
    ///
    /// - DuckDB: `$."key"`
    /// - ClickHouse: `key` (JSONExtract* take member names directly)
    fn json_path(&self, key: &str) -> String;

    /// Extract a JSON member as text; takes one bound path parameter
    fn json_extract_string(&self, col: &str) -> String;

    /// Extract a JSON member as a double; takes one bound path parameter
    fn json_extract_number(&self, col: &str) -> String;

    /// True when the JSON member exists; takes one bound path parameter
    fn json_has(&self, col: &str) -> String;

    /// `expr LIKE ?` with backslash as the escape character
    fn like_escaped(&self, expr: &str) -> String;

    /// Existence check of rows in `inner_table` linked to `outer_col`
    ///
    /// - DuckDB: `EXISTS (SELECT 1 FROM inner WHERE inner_col = outer_col AND conditions)`
    /// - ClickHouse: `outer_col IN (SELECT inner_col FROM inner WHERE conditions)`
    ///
    /// Both forms test membership, so a matching outer row is counted once
    /// regardless of how many inner rows match.
    fn semi_join(
        &self,
        outer_col: &str,
        inner_table: &str,
        inner_col: &str,
        conditions: &str,
    ) -> String;
}
