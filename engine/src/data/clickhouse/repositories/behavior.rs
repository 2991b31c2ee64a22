//! Behavioral query repository for ClickHouse
//!
//! Executes the shared query shapes through the HTTP client. The element
//! volume of several keys is fetched concurrently.

use clickhouse::Row;
use clickhouse::query::Query;
use futures::future::try_join_all;
use serde::Deserialize;

use crate::data::clickhouse::{ClickhouseError, ClickhouseService};
use crate::data::queries::{BuiltQuery, QueryParam, boundary, identity, stickiness, volume};
use crate::data::sql::ClickhouseDialect;
use crate::data::types::{ElementPredicate, StickinessCount, StickinessParams};

#[derive(Row, Deserialize)]
struct MappingRow {
    distinct_id: String,
    person_id: String,
}

#[derive(Row, Deserialize)]
struct CountRow {
    intervals: u64,
    persons: u64,
}

/// Bind every parameter of a built query in placeholder order
fn prepare(service: &ClickhouseService, built: &BuiltQuery) -> Query {
    tracing::trace!(sql = %built.sql, params = built.params.len(), "clickhouse query");
    let mut query = service.client().query(&built.sql);
    for param in &built.params {
        query = match param {
            QueryParam::String(s) => query.bind(s.as_str()),
            QueryParam::Int64(i) => query.bind(i),
            QueryParam::Float64(f) => query.bind(f),
        };
    }
    query
}

/// Microsecond timestamp of the team's first event
pub async fn earliest_event_micros(
    service: &ClickhouseService,
    team_id: i64,
) -> Result<Option<i64>, ClickhouseError> {
    let built = boundary::earliest_event(&ClickhouseDialect, team_id);
    service
        .with_timeout(prepare(service, &built).fetch_optional::<i64>())
        .await
}

/// Current person of one distinct id
pub async fn resolve_person(
    service: &ClickhouseService,
    team_id: i64,
    distinct_id: &str,
) -> Result<Option<String>, ClickhouseError> {
    let built = identity::resolve_person(team_id, distinct_id);
    service
        .with_timeout(prepare(service, &built).fetch_optional::<String>())
        .await
}

/// `(distinct_id, person_id)` for every distinct id of the team
pub async fn latest_mapping(
    service: &ClickhouseService,
    team_id: i64,
) -> Result<Vec<(String, String)>, ClickhouseError> {
    let built = identity::latest_mapping(team_id);
    let rows = service
        .with_timeout(prepare(service, &built).fetch_all::<MappingRow>())
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| (r.distinct_id, r.person_id))
        .collect())
}

/// Persons active in exactly `target` buckets
pub async fn stickiness_people(
    service: &ClickhouseService,
    params: &StickinessParams,
    target: u64,
) -> Result<Vec<String>, ClickhouseError> {
    let built = stickiness::stickiness_people(&ClickhouseDialect, params, target);
    service
        .with_timeout(prepare(service, &built).fetch_all::<String>())
        .await
}

/// Stickiness distribution, ascending by interval count
pub async fn stickiness_counts(
    service: &ClickhouseService,
    params: &StickinessParams,
) -> Result<Vec<StickinessCount>, ClickhouseError> {
    let built = stickiness::stickiness_counts(&ClickhouseDialect, params);
    let rows = service
        .with_timeout(prepare(service, &built).fetch_all::<CountRow>())
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| StickinessCount {
            intervals: r.intervals,
            persons: r.persons,
        })
        .collect())
}

/// Window events that no association resolves
pub async fn unresolved_events(
    service: &ClickhouseService,
    params: &StickinessParams,
) -> Result<u64, ClickhouseError> {
    let built = stickiness::unresolved_events(&ClickhouseDialect, params);
    service
        .with_timeout(prepare(service, &built).fetch_one::<u64>())
        .await
}

/// Events matching every positional element predicate
pub async fn event_volume(
    service: &ClickhouseService,
    team_id: i64,
    predicates: &[ElementPredicate],
) -> Result<u64, ClickhouseError> {
    let built = volume::event_volume(&ClickhouseDialect, team_id, predicates);
    service
        .with_timeout(prepare(service, &built).fetch_one::<u64>())
        .await
}

/// Volumes of independent predicate sequences, fetched concurrently
pub async fn event_volumes(
    service: &ClickhouseService,
    team_id: i64,
    sequences: &[(String, Vec<ElementPredicate>)],
) -> Result<Vec<(String, u64)>, ClickhouseError> {
    try_join_all(sequences.iter().map(|(key, predicates)| async move {
        let count = event_volume(service, team_id, predicates).await?;
        Ok::<_, ClickhouseError>((key.clone(), count))
    }))
    .await
}
