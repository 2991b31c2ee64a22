//! ClickHouse SQL dialect implementation

use super::SqlDialect;
use crate::data::types::Granularity;

/// ClickHouse SQL dialect
pub struct ClickhouseDialect;

impl SqlDialect for ClickhouseDialect {
    fn name(&self) -> &'static str {
        "clickhouse"
    }

    fn timestamp_param(&self) -> &'static str {
        "fromUnixTimestamp64Micro(?)"
    }

    fn timestamp_to_micros(&self, col: &str) -> String {
        format!("toInt64(toUnixTimestamp64Micro({}))", col)
    }

    fn truncate_to_bucket(&self, col: &str, granularity: Granularity) -> String {
        match granularity {
            Granularity::Day => format!("toStartOfDay({})", col),
            Granularity::Week => format!("toStartOfWeek({}, 1)", col),
            Granularity::Month => format!("toStartOfMonth({})", col),
        }
    }

    fn array_contains(&self, array_col: &str) -> String {
        format!("has({}, ?)", array_col)
    }

    fn json_path(&self, key: &str) -> String {
        key.to_string()
    }

    fn json_extract_string(&self, col: &str) -> String {
        format!("JSONExtractString({}, ?)", col)
    }

    // JSONExtractFloat returns 0 for missing members, which would satisfy `= 0`
    fn json_extract_number(&self, col: &str) -> String {
        format!("toFloat64OrNull(JSONExtractRaw({}, ?))", col)
    }

    fn json_has(&self, col: &str) -> String {
        format!("JSONHas({}, ?)", col)
    }

    fn like_escaped(&self, expr: &str) -> String {
        format!("{} LIKE ?", expr)
    }

    fn semi_join(
        &self,
        outer_col: &str,
        inner_table: &str,
        inner_col: &str,
        conditions: &str,
    ) -> String {
        format!(
            "{} IN (SELECT {} FROM {} WHERE {})",
            outer_col, inner_col, inner_table, conditions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_bucket_week_starts_monday() {
        let dialect = ClickhouseDialect;
        assert_eq!(
            dialect.truncate_to_bucket("e.timestamp", Granularity::Week),
            "toStartOfWeek(e.timestamp, 1)"
        );
        assert_eq!(
            dialect.truncate_to_bucket("e.timestamp", Granularity::Day),
            "toStartOfDay(e.timestamp)"
        );
        assert_eq!(
            dialect.truncate_to_bucket("e.timestamp", Granularity::Month),
            "toStartOfMonth(e.timestamp)"
        );
    }

    #[test]
    fn test_array_contains() {
        let dialect = ClickhouseDialect;
        assert_eq!(dialect.array_contains("el.attr_class"), "has(el.attr_class, ?)");
    }

    #[test]
    fn test_timestamp_param() {
        let dialect = ClickhouseDialect;
        assert_eq!(dialect.timestamp_param(), "fromUnixTimestamp64Micro(?)");
    }

    #[test]
    fn test_json_path_is_raw_key() {
        let dialect = ClickhouseDialect;
        assert_eq!(dialect.json_path("utm.source"), "utm.source");
    }

    #[test]
    fn test_semi_join_uses_in_subquery() {
        let dialect = ClickhouseDialect;
        assert_eq!(
            dialect.semi_join("e.id", "elements el", "el.event_id", "el.order_index = ?"),
            "e.id IN (SELECT el.event_id FROM elements el WHERE el.order_index = ?)"
        );
    }
}
