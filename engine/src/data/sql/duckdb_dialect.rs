//! DuckDB SQL dialect implementation

use super::SqlDialect;
use crate::data::types::Granularity;
use crate::utils::sql::json_member_path;

/// DuckDB SQL dialect
pub struct DuckdbDialect;

impl SqlDialect for DuckdbDialect {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn timestamp_param(&self) -> &'static str {
        "make_timestamp(?)"
    }

    fn timestamp_to_micros(&self, col: &str) -> String {
        format!("epoch_us({})", col)
    }

    fn truncate_to_bucket(&self, col: &str, granularity: Granularity) -> String {
        format!("date_trunc('{}', {})", granularity.as_str(), col)
    }

    fn array_contains(&self, array_col: &str) -> String {
        format!("list_contains({}, ?)", array_col)
    }

    fn json_path(&self, key: &str) -> String {
        json_member_path(key)
    }

    fn json_extract_string(&self, col: &str) -> String {
        format!("json_extract_string({}, ?)", col)
    }

    fn json_extract_number(&self, col: &str) -> String {
        format!("TRY_CAST(json_extract_string({}, ?) AS DOUBLE)", col)
    }

    fn json_has(&self, col: &str) -> String {
        format!("json_extract({}, ?) IS NOT NULL", col)
    }

    fn like_escaped(&self, expr: &str) -> String {
        format!("{} LIKE ? ESCAPE '\\'", expr)
    }

    fn semi_join(
        &self,
        outer_col: &str,
        inner_table: &str,
        inner_col: &str,
        conditions: &str,
    ) -> String {
        format!(
            "EXISTS (SELECT 1 FROM {} WHERE {} = {} AND {})",
            inner_table, inner_col, outer_col, conditions
        )
    }
}
