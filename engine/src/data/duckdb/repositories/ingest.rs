//! DuckDB ingestion repository
//!
//! Events and associations go through the Appender API. Elements use a
//! prepared insert because the Appender cannot build `VARCHAR[]` values
//! from text.

use duckdb::{Connection, params};

use crate::data::duckdb::sql_types::{SqlJson, SqlTimestamp, SqlVec};
use crate::data::duckdb::{DuckdbError, in_transaction};
use crate::data::types::{DistinctIdAssociation, ElementRow, Event};

const INSERT_ELEMENT_SQL: &str = "INSERT INTO elements \
    (team_id, event_id, order_index, tag_name, text, href, attr_id, attr_class, nth_child, nth_of_type, attributes) \
    VALUES (?, ?, ?, ?, ?, ?, ?, from_json(?::JSON, '[\"VARCHAR\"]'), ?, ?, ?)";

/// Append events together with their element chains.
///
/// Returns the number of element rows written.
pub fn append_events(conn: &Connection, events: &[Event]) -> Result<usize, DuckdbError> {
    if events.is_empty() {
        return Ok(0);
    }

    in_transaction(conn, |conn| {
        insert_events(conn, events)?;
        let rows: Vec<ElementRow<'_>> = events.iter().flat_map(Event::element_rows).collect();
        insert_elements(conn, &rows)?;
        Ok(rows.len())
    })
}

fn insert_events(conn: &Connection, events: &[Event]) -> Result<(), DuckdbError> {
    let mut appender = conn.appender("events")?;

    for event in events {
        // Column order must match schema.rs CREATE TABLE definition
        appender.append_row(params![
            event.id,
            event.team_id,
            event.distinct_id,
            event.event,
            SqlTimestamp(event.timestamp),
            SqlJson(&event.properties),
        ])?;
    }

    appender.flush()?;
    Ok(())
}

fn insert_elements(conn: &Connection, rows: &[ElementRow<'_>]) -> Result<(), DuckdbError> {
    if rows.is_empty() {
        return Ok(());
    }

    let mut stmt = conn.prepare(INSERT_ELEMENT_SQL)?;
    for row in rows {
        let el = row.element;
        stmt.execute(params![
            row.team_id,
            row.event_id,
            el.order_index,
            el.tag_name,
            el.text,
            el.href,
            el.attr_id,
            SqlVec(&el.attr_class),
            el.nth_child,
            el.nth_of_type,
            SqlJson(&el.attributes),
        ])?;
    }
    Ok(())
}

/// Append identity associations
pub fn append_associations(
    conn: &Connection,
    associations: &[DistinctIdAssociation],
) -> Result<(), DuckdbError> {
    if associations.is_empty() {
        return Ok(());
    }

    in_transaction(conn, |conn| {
        let mut appender = conn.appender("person_distinct_id")?;
        for assoc in associations {
            appender.append_row(params![
                assoc.id,
                assoc.team_id,
                assoc.distinct_id,
                assoc.person_id,
                SqlTimestamp(assoc.created_at),
            ])?;
        }
        appender.flush()?;
        Ok(())
    })
}
