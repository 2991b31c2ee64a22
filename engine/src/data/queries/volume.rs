//! Ordered element predicate matching
//!
//! An event matches `[P0, .., Pn-1]` when, for every position `i`, one of its
//! elements has `order_index = i` and satisfies `Pi`. Each position becomes
//! its own team-scoped existence check so the element table is never
//! self-joined and an event is counted at most once.

use super::builder::{BuiltQuery, ConditionBuilder, QueryParam};
use crate::data::sql::SqlDialect;
use crate::data::types::{ElementAttribute, ElementPredicate};

/// Conditions on `elements el` for one position
fn position_conditions(
    dialect: &dyn SqlDialect,
    team_id: i64,
    position: usize,
    predicate: &ElementPredicate,
) -> (String, Vec<QueryParam>) {
    let mut builder = ConditionBuilder::new(dialect);
    builder.add_eq("el.team_id", team_id);
    builder.add_eq("el.order_index", position as i64);

    for attribute in &predicate.attributes {
        match attribute {
            ElementAttribute::TagName(v) => builder.add_eq("el.tag_name", v.as_str()),
            ElementAttribute::Text(v) => builder.add_eq("el.text", v.as_str()),
            ElementAttribute::Href(v) => builder.add_eq("el.href", v.as_str()),
            ElementAttribute::AttrId(v) => builder.add_eq("el.attr_id", v.as_str()),
            ElementAttribute::AttrClass(classes) => {
                for class in classes {
                    builder.push(
                        dialect.array_contains("el.attr_class"),
                        vec![QueryParam::String(class.clone())],
                    );
                }
            }
            ElementAttribute::NthChild(n) => builder.add_eq("el.nth_child", *n),
            ElementAttribute::NthOfType(n) => builder.add_eq("el.nth_of_type", *n),
        }
    }

    builder.finish()
}

/// Count of the team's events matching every positional predicate.
///
/// With no predicates every event of the team matches.
pub fn event_volume(
    dialect: &dyn SqlDialect,
    team_id: i64,
    predicates: &[ElementPredicate],
) -> BuiltQuery {
    let mut builder = ConditionBuilder::new(dialect);
    builder.add_eq("e.team_id", team_id);

    for (position, predicate) in predicates.iter().enumerate() {
        let (conditions, params) = position_conditions(dialect, team_id, position, predicate);
        builder.push(
            dialect.semi_join("e.id", "elements el", "el.event_id", &conditions),
            params,
        );
    }

    let (conditions, params) = builder.finish();
    BuiltQuery::new(
        format!("SELECT COUNT(*) AS volume FROM events e WHERE {}", conditions),
        params,
    )
}
