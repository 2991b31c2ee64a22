//! In-memory identity resolution
//!
//! Reduces association records to the current person per distinct id. The
//! result does not depend on the order records are fed in: for each distinct
//! id the record with the greatest `(created_at, id)` wins.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;

use crate::data::types::DistinctIdAssociation;

#[derive(Debug, Clone)]
struct Current {
    created_at: DateTime<Utc>,
    id: i64,
    person_id: String,
}

/// Latest-association arena for one team
#[derive(Debug, Default)]
pub struct IdentityArena {
    current: FxHashMap<String, Current>,
}

impl IdentityArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from associations, in any order
    pub fn from_associations<'a, I>(associations: I) -> Self
    where
        I: IntoIterator<Item = &'a DistinctIdAssociation>,
    {
        let mut arena = Self::new();
        for assoc in associations {
            arena.observe(assoc);
        }
        arena
    }

    /// Feed one association; keeps it only if it supersedes the current one
    pub fn observe(&mut self, assoc: &DistinctIdAssociation) {
        let candidate = (assoc.created_at, assoc.id);
        match self.current.get_mut(&assoc.distinct_id) {
            Some(cur) if (cur.created_at, cur.id) >= candidate => {}
            Some(cur) => {
                cur.created_at = assoc.created_at;
                cur.id = assoc.id;
                cur.person_id.clone_from(&assoc.person_id);
            }
            None => {
                self.current.insert(
                    assoc.distinct_id.clone(),
                    Current {
                        created_at: assoc.created_at,
                        id: assoc.id,
                        person_id: assoc.person_id.clone(),
                    },
                );
            }
        }
    }

    pub fn resolve(&self, distinct_id: &str) -> Option<&str> {
        self.current.get(distinct_id).map(|c| c.person_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Sorted distinct id -> person map
    pub fn into_mapping(self) -> BTreeMap<String, String> {
        self.current
            .into_iter()
            .map(|(did, cur)| (did, cur.person_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn assoc(id: i64, distinct_id: &str, person: &str, day: u32) -> DistinctIdAssociation {
        DistinctIdAssociation {
            id,
            team_id: 1,
            distinct_id: distinct_id.to_string(),
            person_id: person.to_string(),
            created_at: Utc.with_ymd_and_hms(2021, 1, day, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_later_association_wins_in_any_order() {
        let a = assoc(1, "d1", "A", 1);
        let b = assoc(2, "d1", "B", 2);

        let forward = IdentityArena::from_associations([&a, &b]);
        let backward = IdentityArena::from_associations([&b, &a]);
        assert_eq!(forward.resolve("d1"), Some("B"));
        assert_eq!(backward.resolve("d1"), Some("B"));
    }

    #[test]
    fn test_equal_created_at_breaks_tie_by_id() {
        let low = assoc(5, "d1", "A", 3);
        let high = assoc(9, "d1", "B", 3);
        for order in [[&low, &high], [&high, &low]] {
            let arena = IdentityArena::from_associations(order);
            assert_eq!(arena.resolve("d1"), Some("B"));
        }
    }

    #[test]
    fn test_unknown_distinct_id_is_unresolved() {
        let arena = IdentityArena::from_associations([&assoc(1, "d1", "A", 1)]);
        assert_eq!(arena.resolve("d2"), None);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_into_mapping_is_sorted() {
        let arena = IdentityArena::from_associations([
            &assoc(1, "zeta", "P1", 1),
            &assoc(2, "alpha", "P2", 1),
            &assoc(3, "alpha", "P3", 2),
        ]);
        let mapping = arena.into_mapping();
        let keys: Vec<&str> = mapping.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
        assert_eq!(mapping["alpha"], "P3");
    }
}
