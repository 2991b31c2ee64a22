//! Earliest event of a team

use super::builder::{BuiltQuery, QueryParam};
use crate::data::sql::SqlDialect;

/// Timestamp (microseconds) of the team's first event; zero rows when the team has none.
///
/// `min()` is avoided because ClickHouse returns the epoch instead of NULL on
/// an empty set.
pub fn earliest_event(dialect: &dyn SqlDialect, team_id: i64) -> BuiltQuery {
    BuiltQuery::new(
        format!(
            "SELECT {} AS ts FROM events WHERE team_id = ? ORDER BY timestamp ASC LIMIT 1",
            dialect.timestamp_to_micros("timestamp")
        ),
        vec![QueryParam::Int64(team_id)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sql::{ClickhouseDialect, DuckdbDialect};

    #[test]
    fn test_earliest_event_duckdb() {
        let q = earliest_event(&DuckdbDialect, 7);
        assert_eq!(
            q.sql,
            "SELECT epoch_us(timestamp) AS ts FROM events WHERE team_id = ? ORDER BY timestamp ASC LIMIT 1"
        );
        assert_eq!(q.params, vec![QueryParam::Int64(7)]);
    }

    #[test]
    fn test_earliest_event_clickhouse() {
        let q = earliest_event(&ClickhouseDialect, 7);
        assert!(q.sql.starts_with("SELECT toInt64(toUnixTimestamp64Micro(timestamp)) AS ts"));
        assert_eq!(q.placeholder_count(), q.params.len());
    }
}
