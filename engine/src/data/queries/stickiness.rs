//! Stickiness aggregation
//!
//! Events in the window are joined to their current person, truncated to
//! buckets, and counted per person as distinct active buckets. Events whose
//! distinct id has no association drop out of the inner join.

use super::builder::{BuiltQuery, ConditionBuilder, QueryParam};
use super::identity::LATEST_MAPPING_SUBQUERY;
use crate::data::sql::SqlDialect;
use crate::data::types::StickinessParams;

/// Conditions selecting the window's events from `events e`
fn window_conditions(dialect: &dyn SqlDialect, params: &StickinessParams) -> (String, Vec<QueryParam>) {
    let mut builder = ConditionBuilder::new(dialect);
    builder.add_eq("e.team_id", params.team_id);
    builder.add_timestamp_gte("e.timestamp", &params.date_from);
    builder.add_timestamp_lte("e.timestamp", &params.date_to);
    params.filter.apply(&mut builder, "e");
    builder.finish()
}

/// `(person_id, intervals)` per resolved person with at least one event
fn per_person(dialect: &dyn SqlDialect, params: &StickinessParams) -> BuiltQuery {
    let (conditions, where_params) = window_conditions(dialect, params);
    let sql = format!(
        "SELECT m.person_id AS person_id, COUNT(DISTINCT {bucket}) AS intervals \
         FROM events e \
         INNER JOIN ({mapping}) AS m ON m.distinct_id = e.distinct_id \
         WHERE {conditions} \
         GROUP BY m.person_id",
        bucket = dialect.truncate_to_bucket("e.timestamp", params.granularity),
        mapping = LATEST_MAPPING_SUBQUERY,
        conditions = conditions,
    );
    // The mapping subquery's team placeholder precedes the WHERE clause
    let mut all = vec![QueryParam::Int64(params.team_id)];
    all.extend(where_params);
    BuiltQuery::new(sql, all)
}

/// Persons active in exactly `target_interval_count` buckets
pub fn stickiness_people(
    dialect: &dyn SqlDialect,
    params: &StickinessParams,
    target_interval_count: u64,
) -> BuiltQuery {
    let inner = per_person(dialect, params);
    let mut query_params = inner.params;
    query_params.push(QueryParam::Int64(
        i64::try_from(target_interval_count).unwrap_or(i64::MAX),
    ));
    BuiltQuery::new(
        format!(
            "SELECT person_id FROM ({}) AS counts WHERE intervals = ? ORDER BY person_id",
            inner.sql
        ),
        query_params,
    )
}

/// `(intervals, persons)` for every interval count that occurs
pub fn stickiness_counts(dialect: &dyn SqlDialect, params: &StickinessParams) -> BuiltQuery {
    let inner = per_person(dialect, params);
    BuiltQuery::new(
        format!(
            "SELECT intervals, COUNT(*) AS persons FROM ({}) AS counts \
             GROUP BY intervals ORDER BY intervals",
            inner.sql
        ),
        inner.params,
    )
}

/// Window events whose distinct id has no association at all
pub fn unresolved_events(dialect: &dyn SqlDialect, params: &StickinessParams) -> BuiltQuery {
    let (conditions, mut where_params) = window_conditions(dialect, params);
    where_params.push(QueryParam::Int64(params.team_id));
    BuiltQuery::new(
        format!(
            "SELECT COUNT(*) AS unresolved FROM events e WHERE {} \
             AND e.distinct_id NOT IN (SELECT distinct_id FROM person_distinct_id WHERE team_id = ?)",
            conditions
        ),
        where_params,
    )
}
