//! ClickHouse ingestion repository
//!
//! Batch inserts through the RowBinary insert API.

use chrono::{DateTime, Utc};
use clickhouse::{Client, Row};
use serde::Serialize;

use crate::data::clickhouse::ClickhouseError;
use crate::data::types::{DistinctIdAssociation, ElementRow, Event};

#[derive(Row, Serialize)]
struct EventInsertRow {
    id: String,
    team_id: i64,
    distinct_id: String,
    event: String,
    #[serde(with = "clickhouse::serde::time::datetime64::micros")]
    timestamp: time::OffsetDateTime,
    properties: String,
}

impl From<&Event> for EventInsertRow {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            team_id: event.team_id,
            distinct_id: event.distinct_id.clone(),
            event: event.event.clone(),
            timestamp: chrono_to_time(event.timestamp),
            properties: json_object_string(&event.properties),
        }
    }
}

#[derive(Row, Serialize)]
struct ElementInsertRow {
    team_id: i64,
    event_id: String,
    order_index: u32,
    tag_name: Option<String>,
    text: Option<String>,
    href: Option<String>,
    attr_id: Option<String>,
    attr_class: Vec<String>,
    nth_child: Option<i64>,
    nth_of_type: Option<i64>,
    attributes: String,
}

impl From<&ElementRow<'_>> for ElementInsertRow {
    fn from(row: &ElementRow<'_>) -> Self {
        let el = row.element;
        Self {
            team_id: row.team_id,
            event_id: row.event_id.to_string(),
            order_index: el.order_index,
            tag_name: el.tag_name.clone(),
            text: el.text.clone(),
            href: el.href.clone(),
            attr_id: el.attr_id.clone(),
            attr_class: el.attr_class.clone(),
            nth_child: el.nth_child,
            nth_of_type: el.nth_of_type,
            attributes: json_object_string(&el.attributes),
        }
    }
}

#[derive(Row, Serialize)]
struct AssociationInsertRow {
    id: i64,
    team_id: i64,
    distinct_id: String,
    person_id: String,
    #[serde(with = "clickhouse::serde::time::datetime64::micros")]
    created_at: time::OffsetDateTime,
}

impl From<&DistinctIdAssociation> for AssociationInsertRow {
    fn from(assoc: &DistinctIdAssociation) -> Self {
        Self {
            id: assoc.id,
            team_id: assoc.team_id,
            distinct_id: assoc.distinct_id.clone(),
            person_id: assoc.person_id.clone(),
            created_at: chrono_to_time(assoc.created_at),
        }
    }
}

/// Convert chrono DateTime to time OffsetDateTime
fn chrono_to_time(dt: DateTime<Utc>) -> time::OffsetDateTime {
    time::OffsetDateTime::from_unix_timestamp_nanos(dt.timestamp_nanos_opt().unwrap_or(0) as i128)
        .unwrap_or(time::OffsetDateTime::UNIX_EPOCH)
}

/// JSON text for a properties/attributes column; `null` becomes `{}`
fn json_object_string(value: &serde_json::Value) -> String {
    if value.is_null() {
        "{}".to_string()
    } else {
        value.to_string()
    }
}

/// Insert events and their elements; returns the number of element rows
pub async fn insert_events(client: &Client, events: &[Event]) -> Result<usize, ClickhouseError> {
    if events.is_empty() {
        return Ok(0);
    }

    let mut insert: clickhouse::insert::Insert<EventInsertRow> = client.insert("events").await?;
    for event in events {
        insert.write(&EventInsertRow::from(event)).await?;
    }
    insert.end().await?;

    let rows: Vec<ElementRow<'_>> = events.iter().flat_map(Event::element_rows).collect();
    if !rows.is_empty() {
        let mut insert: clickhouse::insert::Insert<ElementInsertRow> =
            client.insert("elements").await?;
        for row in &rows {
            insert.write(&ElementInsertRow::from(row)).await?;
        }
        insert.end().await?;
    }

    Ok(rows.len())
}

/// Insert identity associations
pub async fn insert_associations(
    client: &Client,
    associations: &[DistinctIdAssociation],
) -> Result<(), ClickhouseError> {
    if associations.is_empty() {
        return Ok(());
    }

    let mut insert: clickhouse::insert::Insert<AssociationInsertRow> =
        client.insert("person_distinct_id").await?;
    for assoc in associations {
        insert.write(&AssociationInsertRow::from(assoc)).await?;
    }
    insert.end().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::Element;
    use chrono::TimeZone;

    #[test]
    fn test_chrono_to_time_keeps_micros() {
        let dt = Utc.with_ymd_and_hms(2020, 1, 4, 14, 10, 0).unwrap()
            + chrono::Duration::microseconds(123_456);
        let converted = chrono_to_time(dt);
        assert_eq!(converted.unix_timestamp(), dt.timestamp());
        assert_eq!(converted.microsecond(), 123_456);
    }

    #[test]
    fn test_event_row_from_event() {
        let ts = Utc.with_ymd_and_hms(2020, 1, 4, 14, 10, 0).unwrap();
        let event = Event::new(5, "d1", "$pageview", ts)
            .with_properties(serde_json::json!({"$browser": "Firefox"}));
        let row = EventInsertRow::from(&event);
        assert_eq!(row.team_id, 5);
        assert_eq!(row.properties, r#"{"$browser":"Firefox"}"#);
    }

    #[test]
    fn test_element_row_carries_event_scope() {
        let ts = Utc.with_ymd_and_hms(2020, 1, 4, 14, 10, 0).unwrap();
        let event = Event::new(5, "d1", "$autocapture", ts)
            .with_elements(vec![Element::tag("a"), Element::tag("li").with_nth(2, 2)]);
        let rows: Vec<ElementInsertRow> = event.element_rows().iter().map(ElementInsertRow::from).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].order_index, 1);
        assert_eq!(rows[1].nth_child, Some(2));
        assert_eq!(rows[1].event_id, event.id);
        assert_eq!(rows[0].attributes, "{}");
    }
}
