//! Parameterized query building shared by both backends
//!
//! All user-controllable values go through [`QueryParam`] and are bound in
//! order. Table names, column names and dialect fragments are the only text
//! spliced into SQL, and none of them come from user input.

use chrono::{DateTime, Utc};

use crate::data::sql::SqlDialect;

/// Query parameter bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    /// String parameter (bound as-is)
    String(String),
    /// Integer parameter (ids, positions, timestamps as microseconds)
    Int64(i64),
    /// Floating point parameter (numeric property comparisons)
    Float64(f64),
}

impl From<&str> for QueryParam {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for QueryParam {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for QueryParam {
    fn from(i: i64) -> Self {
        Self::Int64(i)
    }
}

impl From<f64> for QueryParam {
    fn from(f: f64) -> Self {
        Self::Float64(f)
    }
}

/// SQL text plus its parameters in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl BuiltQuery {
    pub fn new(sql: impl Into<String>, params: Vec<QueryParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Number of `?` placeholders in the SQL text
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }
}

/// Builder for parameterized WHERE clauses.
///
/// Conditions are AND-ed in insertion order and their parameters are kept in
/// the same order, so the result can be spliced into a larger statement as
/// long as the caller appends any later parameters after these.
pub struct ConditionBuilder<'d> {
    dialect: &'d dyn SqlDialect,
    conditions: Vec<String>,
    params: Vec<QueryParam>,
}

impl<'d> ConditionBuilder<'d> {
    pub fn new(dialect: &'d dyn SqlDialect) -> Self {
        Self {
            dialect,
            conditions: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn dialect(&self) -> &'d dyn SqlDialect {
        self.dialect
    }

    /// Add an equality condition: `column = ?`
    pub fn add_eq(&mut self, column: &str, value: impl Into<QueryParam>) {
        self.conditions.push(format!("{} = ?", column));
        self.params.push(value.into());
    }

    /// Add a timestamp >= condition bound as microseconds
    pub fn add_timestamp_gte(&mut self, column: &str, ts: &DateTime<Utc>) {
        self.conditions
            .push(format!("{} >= {}", column, self.dialect.timestamp_param()));
        self.params.push(QueryParam::Int64(ts.timestamp_micros()));
    }

    /// Add a timestamp <= condition bound as microseconds
    pub fn add_timestamp_lte(&mut self, column: &str, ts: &DateTime<Utc>) {
        self.conditions
            .push(format!("{} <= {}", column, self.dialect.timestamp_param()));
        self.params.push(QueryParam::Int64(ts.timestamp_micros()));
    }

    /// Add a condition with its own parameters.
    ///
    /// The condition must contain exactly `params.len()` placeholders.
    pub fn push(&mut self, condition: String, params: Vec<QueryParam>) {
        debug_assert_eq!(condition.matches('?').count(), params.len());
        self.conditions.push(condition);
        self.params.extend(params);
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The AND-ed clause (without `WHERE`) and its parameters.
    ///
    /// An empty builder yields `1 = 1`.
    pub fn finish(self) -> (String, Vec<QueryParam>) {
        if self.conditions.is_empty() {
            return ("1 = 1".to_string(), self.params);
        }
        (self.conditions.join(" AND "), self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sql::{ClickhouseDialect, DuckdbDialect};
    use chrono::TimeZone;

    #[test]
    fn test_conditions_and_params_keep_order() {
        let mut builder = ConditionBuilder::new(&DuckdbDialect);
        builder.add_eq("e.team_id", 2i64);
        builder.add_eq("e.event", "$pageview");
        let (sql, params) = builder.finish();
        assert_eq!(sql, "e.team_id = ? AND e.event = ?");
        assert_eq!(
            params,
            vec![QueryParam::Int64(2), QueryParam::String("$pageview".into())]
        );
    }

    #[test]
    fn test_timestamp_bounds_use_dialect() {
        let ts = Utc.with_ymd_and_hms(2021, 1, 14, 0, 0, 0).unwrap();

        let mut duck = ConditionBuilder::new(&DuckdbDialect);
        duck.add_timestamp_gte("timestamp", &ts);
        let (sql, params) = duck.finish();
        assert_eq!(sql, "timestamp >= make_timestamp(?)");
        assert_eq!(params, vec![QueryParam::Int64(ts.timestamp_micros())]);

        let mut ch = ConditionBuilder::new(&ClickhouseDialect);
        ch.add_timestamp_lte("timestamp", &ts);
        let (sql, _) = ch.finish();
        assert_eq!(sql, "timestamp <= fromUnixTimestamp64Micro(?)");
    }

    #[test]
    fn test_empty_builder_is_tautology() {
        let builder = ConditionBuilder::new(&DuckdbDialect);
        assert!(builder.is_empty());
        let (sql, params) = builder.finish();
        assert_eq!(sql, "1 = 1");
        assert!(params.is_empty());
    }

    #[test]
    fn test_placeholder_count() {
        let q = BuiltQuery::new("SELECT ? + ?", vec![1i64.into(), 2i64.into()]);
        assert_eq!(q.placeholder_count(), 2);
    }
}
