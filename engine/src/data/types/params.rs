//! Validated query parameters handed to the repositories

use chrono::{DateTime, Utc};

use super::Granularity;
use crate::data::filters::EntityFilter;

/// One required attribute value of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementAttribute {
    TagName(String),
    Text(String),
    Href(String),
    AttrId(String),
    /// Every listed class must be present on the element
    AttrClass(Vec<String>),
    NthChild(i64),
    NthOfType(i64),
}

/// Conjunction of attribute requirements for the element at one position.
///
/// An empty predicate matches any element, but the element must exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementPredicate {
    pub attributes: Vec<ElementAttribute>,
}

impl ElementPredicate {
    pub fn new(attributes: Vec<ElementAttribute>) -> Self {
        Self { attributes }
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Fully resolved stickiness window
#[derive(Debug, Clone, PartialEq)]
pub struct StickinessParams {
    pub team_id: i64,
    pub filter: EntityFilter,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub granularity: Granularity,
}
