//! Behavioral query repository for DuckDB
//!
//! Executes the shared query shapes against a single connection.

use duckdb::{Connection, Row, params_from_iter};

use crate::data::duckdb::DuckdbError;
use crate::data::queries::{BuiltQuery, boundary, identity, stickiness, volume};
use crate::data::sql::DuckdbDialect;
use crate::data::types::{ElementPredicate, StickinessCount, StickinessParams};

/// Run a built query and map every row
fn query_rows<T, F>(conn: &Connection, query: &BuiltQuery, f: F) -> Result<Vec<T>, DuckdbError>
where
    F: FnMut(&Row<'_>) -> duckdb::Result<T>,
{
    tracing::trace!(sql = %query.sql, params = query.params.len(), "duckdb query");
    let mut stmt = conn.prepare(&query.sql)?;
    let rows = stmt.query_map(params_from_iter(query.params.iter()), f)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Run a built query returning a single count
fn query_count(conn: &Connection, query: &BuiltQuery) -> Result<u64, DuckdbError> {
    tracing::trace!(sql = %query.sql, params = query.params.len(), "duckdb count");
    let count: i64 = conn.query_row(&query.sql, params_from_iter(query.params.iter()), |row| {
        row.get(0)
    })?;
    Ok(count.max(0) as u64)
}

/// Microsecond timestamp of the team's first event
pub fn earliest_event_micros(conn: &Connection, team_id: i64) -> Result<Option<i64>, DuckdbError> {
    let query = boundary::earliest_event(&DuckdbDialect, team_id);
    let rows = query_rows(conn, &query, |row| row.get::<_, i64>(0))?;
    Ok(rows.into_iter().next())
}

/// Current person of one distinct id
pub fn resolve_person(
    conn: &Connection,
    team_id: i64,
    distinct_id: &str,
) -> Result<Option<String>, DuckdbError> {
    let query = identity::resolve_person(team_id, distinct_id);
    let rows = query_rows(conn, &query, |row| row.get::<_, String>(0))?;
    Ok(rows.into_iter().next())
}

/// `(distinct_id, person_id)` for every distinct id of the team
pub fn latest_mapping(conn: &Connection, team_id: i64) -> Result<Vec<(String, String)>, DuckdbError> {
    let query = identity::latest_mapping(team_id);
    query_rows(conn, &query, |row| Ok((row.get(0)?, row.get(1)?)))
}

/// Persons active in exactly `target` buckets
pub fn stickiness_people(
    conn: &Connection,
    params: &StickinessParams,
    target: u64,
) -> Result<Vec<String>, DuckdbError> {
    let query = stickiness::stickiness_people(&DuckdbDialect, params, target);
    query_rows(conn, &query, |row| row.get::<_, String>(0))
}

/// Stickiness distribution, ascending by interval count
pub fn stickiness_counts(
    conn: &Connection,
    params: &StickinessParams,
) -> Result<Vec<StickinessCount>, DuckdbError> {
    let query = stickiness::stickiness_counts(&DuckdbDialect, params);
    query_rows(conn, &query, |row| {
        let intervals: i64 = row.get(0)?;
        let persons: i64 = row.get(1)?;
        Ok(StickinessCount {
            intervals: intervals.max(0) as u64,
            persons: persons.max(0) as u64,
        })
    })
}

/// Window events that no association resolves
pub fn unresolved_events(conn: &Connection, params: &StickinessParams) -> Result<u64, DuckdbError> {
    query_count(conn, &stickiness::unresolved_events(&DuckdbDialect, params))
}

/// Events matching every positional element predicate
pub fn event_volume(
    conn: &Connection,
    team_id: i64,
    predicates: &[ElementPredicate],
) -> Result<u64, DuckdbError> {
    query_count(conn, &volume::event_volume(&DuckdbDialect, team_id, predicates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::duckdb::migrations::run_migrations;
    use crate::data::duckdb::repositories::ingest;
    use crate::data::filters::EntityFilter;
    use crate::data::types::{DistinctIdAssociation, Element, ElementAttribute, Event, Granularity};
    use chrono::{DateTime, TimeZone, Utc};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("LOAD json;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, day, hour, 10, 0).unwrap()
    }

    fn link(id: i64, distinct_id: &str, person_id: &str, created_at: DateTime<Utc>) -> DistinctIdAssociation {
        DistinctIdAssociation {
            id,
            team_id: 1,
            distinct_id: distinct_id.to_string(),
            person_id: person_id.to_string(),
            created_at,
        }
    }

    #[test]
    fn test_earliest_event_empty_team() {
        let conn = setup();
        assert_eq!(earliest_event_micros(&conn, 1).unwrap(), None);
    }

    #[test]
    fn test_earliest_event_is_minimum() {
        let conn = setup();
        ingest::append_events(
            &conn,
            &[Event::new(1, "d1", "$pageview", at(6, 14)), Event::new(1, "d1", "$pageview", at(4, 14))],
        )
        .unwrap();
        assert_eq!(
            earliest_event_micros(&conn, 1).unwrap(),
            Some(at(4, 14).timestamp_micros())
        );
        assert_eq!(earliest_event_micros(&conn, 2).unwrap(), None);
    }

    #[test]
    fn test_latest_mapping_breaks_ties_by_id() {
        let conn = setup();
        ingest::append_associations(
            &conn,
            &[
                link(2, "anon", "person-b", at(1, 0)),
                link(1, "anon", "person-a", at(1, 0)),
                link(3, "other", "person-c", at(1, 0)),
            ],
        )
        .unwrap();
        let mapping = latest_mapping(&conn, 1).unwrap();
        assert_eq!(
            mapping,
            vec![
                ("anon".to_string(), "person-b".to_string()),
                ("other".to_string(), "person-c".to_string())
            ]
        );
        assert_eq!(
            resolve_person(&conn, 1, "anon").unwrap().as_deref(),
            Some("person-b")
        );
        assert_eq!(resolve_person(&conn, 1, "missing").unwrap(), None);
    }

    #[test]
    fn test_stickiness_people_and_counts() {
        let conn = setup();
        ingest::append_associations(
            &conn,
            &[link(1, "d1", "p1", at(1, 0)), link(2, "d2", "p2", at(1, 0))],
        )
        .unwrap();
        ingest::append_events(
            &conn,
            &[
                Event::new(1, "d1", "$pageview", at(2, 9)),
                Event::new(1, "d1", "$pageview", at(2, 18)),
                Event::new(1, "d1", "$pageview", at(3, 9)),
                Event::new(1, "d2", "$pageview", at(2, 9)),
                Event::new(1, "ghost", "$pageview", at(2, 9)),
            ],
        )
        .unwrap();

        let params = StickinessParams {
            team_id: 1,
            filter: EntityFilter::default(),
            date_from: at(1, 0),
            date_to: at(7, 0),
            granularity: Granularity::Day,
        };

        assert_eq!(stickiness_people(&conn, &params, 2).unwrap(), vec!["p1".to_string()]);
        assert_eq!(stickiness_people(&conn, &params, 1).unwrap(), vec!["p2".to_string()]);
        assert_eq!(
            stickiness_counts(&conn, &params).unwrap(),
            vec![
                StickinessCount { intervals: 1, persons: 1 },
                StickinessCount { intervals: 2, persons: 1 },
            ]
        );
        assert_eq!(unresolved_events(&conn, &params).unwrap(), 1);
    }

    #[test]
    fn test_event_volume_attr_class_all_required() {
        let conn = setup();
        let event = Event::new(1, "d1", "$autocapture", at(2, 9)).with_elements(vec![
            Element::tag("button").with_classes(&["btn", "primary"]),
            Element::tag("div"),
        ]);
        ingest::append_events(&conn, &[event]).unwrap();

        let both = vec![ElementPredicate::new(vec![ElementAttribute::AttrClass(vec![
            "btn".into(),
            "primary".into(),
        ])])];
        assert_eq!(event_volume(&conn, 1, &both).unwrap(), 1);

        let missing = vec![ElementPredicate::new(vec![ElementAttribute::AttrClass(vec![
            "btn".into(),
            "danger".into(),
        ])])];
        assert_eq!(event_volume(&conn, 1, &missing).unwrap(), 0);
    }
}
