//! Event store records
//!
//! Events, their element chains and identity associations are append-only.
//! These types are used both for ingestion and for fixtures in tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn new_event_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// A single captured event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default = "new_event_id")]
    pub id: String,
    pub team_id: i64,
    pub distinct_id: String,
    pub event: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default = "empty_object")]
    pub properties: serde_json::Value,
    /// Element chain for autocaptured interactions, innermost first
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Event {
    pub fn new(
        team_id: i64,
        distinct_id: impl Into<String>,
        event: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_event_id(),
            team_id,
            distinct_id: distinct_id.into(),
            event: event.into(),
            timestamp,
            properties: empty_object(),
            elements: Vec::new(),
        }
    }

    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = properties;
        self
    }

    /// Attach an element chain. Positions are assigned from slice order.
    pub fn with_elements(mut self, elements: Vec<Element>) -> Self {
        self.elements = elements
            .into_iter()
            .enumerate()
            .map(|(i, mut el)| {
                el.order_index = i as u32;
                el
            })
            .collect();
        self
    }

    /// Rows for the elements table, each carrying this event's team and id
    pub fn element_rows(&self) -> Vec<ElementRow<'_>> {
        self.elements
            .iter()
            .map(|element| ElementRow {
                team_id: self.team_id,
                event_id: &self.id,
                element,
            })
            .collect()
    }
}

/// One DOM element of an event's element chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Position in the chain; 0 is the element that received the interaction
    #[serde(default, alias = "order")]
    pub order_index: u32,
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub attr_id: Option<String>,
    #[serde(default)]
    pub attr_class: Vec<String>,
    #[serde(default)]
    pub nth_child: Option<i64>,
    #[serde(default)]
    pub nth_of_type: Option<i64>,
    #[serde(default = "empty_object")]
    pub attributes: serde_json::Value,
}

impl Element {
    pub fn tag(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: Some(tag_name.into()),
            attributes: empty_object(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn with_attr_id(mut self, attr_id: impl Into<String>) -> Self {
        self.attr_id = Some(attr_id.into());
        self
    }

    pub fn with_classes(mut self, classes: &[&str]) -> Self {
        self.attr_class = classes.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_nth(mut self, nth_child: i64, nth_of_type: i64) -> Self {
        self.nth_child = Some(nth_child);
        self.nth_of_type = Some(nth_of_type);
        self
    }
}

/// Element joined with its owning event for insertion
#[derive(Debug, Clone, Copy)]
pub struct ElementRow<'a> {
    pub team_id: i64,
    pub event_id: &'a str,
    pub element: &'a Element,
}

/// Link between a distinct id and a person.
///
/// The row with the greatest `(created_at, id)` per distinct id is current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistinctIdAssociation {
    pub id: i64,
    pub team_id: i64,
    pub distinct_id: String,
    pub person_id: String,
    pub created_at: DateTime<Utc>,
}

/// Batch accepted by the ingest command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestBatch {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub associations: Vec<DistinctIdAssociation>,
}

impl IngestBatch {
    pub fn element_count(&self) -> usize {
        self.events.iter().map(|e| e.elements.len()).sum()
    }
}

/// Outcome of an append
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub events: usize,
    pub elements: usize,
    pub associations: usize,
}

/// One point of the stickiness distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StickinessCount {
    /// Number of distinct active buckets
    pub intervals: u64,
    /// Persons active in exactly that many buckets
    pub persons: u64,
}
