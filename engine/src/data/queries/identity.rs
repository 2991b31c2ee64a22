//! Latest distinct id to person mapping
//!
//! An association row is current when it has the greatest `(created_at, id)`
//! among the rows of its distinct id. Older rows stay in the table.

use super::builder::{BuiltQuery, QueryParam};

/// Subquery yielding `(distinct_id, person_id)` for the current association of
/// every distinct id of one team. Takes the team id as its only parameter.
pub const LATEST_MAPPING_SUBQUERY: &str = "SELECT distinct_id, person_id FROM (\
SELECT distinct_id, person_id, \
ROW_NUMBER() OVER (PARTITION BY distinct_id ORDER BY created_at DESC, id DESC) AS rn \
FROM person_distinct_id WHERE team_id = ?\
) AS ranked WHERE rn = 1";

/// Full mapping for a team, ordered by distinct id
pub fn latest_mapping(team_id: i64) -> BuiltQuery {
    BuiltQuery::new(
        format!(
            "SELECT distinct_id, person_id FROM ({}) AS latest ORDER BY distinct_id",
            LATEST_MAPPING_SUBQUERY
        ),
        vec![QueryParam::Int64(team_id)],
    )
}

/// Current person of a single distinct id
pub fn resolve_person(team_id: i64, distinct_id: &str) -> BuiltQuery {
    BuiltQuery::new(
        "SELECT person_id FROM person_distinct_id \
         WHERE team_id = ? AND distinct_id = ? \
         ORDER BY created_at DESC, id DESC LIMIT 1",
        vec![
            QueryParam::Int64(team_id),
            QueryParam::String(distinct_id.to_string()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_mapping_ranks_by_created_at_then_id() {
        let q = latest_mapping(3);
        assert!(q.sql.contains(
            "ROW_NUMBER() OVER (PARTITION BY distinct_id ORDER BY created_at DESC, id DESC)"
        ));
        assert!(q.sql.contains("WHERE rn = 1"));
        assert_eq!(q.placeholder_count(), 1);
        assert_eq!(q.params, vec![QueryParam::Int64(3)]);
    }

    #[test]
    fn test_resolve_person_params() {
        let q = resolve_person(3, "anon-1");
        assert_eq!(q.placeholder_count(), 2);
        assert_eq!(
            q.params,
            vec![QueryParam::Int64(3), QueryParam::String("anon-1".into())]
        );
        assert!(q.sql.ends_with("ORDER BY created_at DESC, id DESC LIMIT 1"));
    }
}
