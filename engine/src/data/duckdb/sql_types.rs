//! SQL type wrappers for DuckDB
//!
//! Converts Rust values and built query parameters into DuckDB-compatible
//! SQL values.

use chrono::{DateTime, Utc};
use duckdb::ToSql;
use duckdb::types::{ToSqlOutput, Value};

use crate::data::queries::QueryParam;

impl ToSql for QueryParam {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(match self {
            QueryParam::String(s) => ToSqlOutput::Owned(Value::Text(s.clone())),
            QueryParam::Int64(i) => ToSqlOutput::Owned(Value::BigInt(*i)),
            QueryParam::Float64(f) => ToSqlOutput::Owned(Value::Double(*f)),
        })
    }
}

/// Wrapper for a string list, bound as a JSON array.
///
/// Insert with `from_json(?::JSON, '["VARCHAR"]')` to land in a `VARCHAR[]` column.
pub struct SqlVec<'a>(pub &'a [String]);

impl ToSql for SqlVec<'_> {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        let json = serde_json::to_string(self.0).unwrap_or_else(|_| "[]".to_string());
        Ok(ToSqlOutput::Owned(Value::Text(json)))
    }
}

/// Wrapper for a JSON object column; `null` is stored as `{}`
pub struct SqlJson<'a>(pub &'a serde_json::Value);

impl ToSql for SqlJson<'_> {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        let json = if self.0.is_null() {
            "{}".to_string()
        } else {
            self.0.to_string()
        };
        Ok(ToSqlOutput::Owned(Value::Text(json)))
    }
}

/// Wrapper for DateTime<Utc> to implement ToSql for DuckDB TIMESTAMP
pub struct SqlTimestamp(pub DateTime<Utc>);

impl ToSql for SqlTimestamp {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        let ts = self.0.format("%Y-%m-%d %H:%M:%S%.6f").to_string();
        Ok(ToSqlOutput::Owned(Value::Text(ts)))
    }
}
