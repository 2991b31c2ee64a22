//! Demo dataset generator
//!
//! Produces a year of pageviews, button clicks and purchases for a handful of
//! persons. Some persons browse under two distinct ids that are later merged,
//! and a few anonymous visitors never get identified.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::json;

use super::identity::IdentityArena;
use crate::data::types::{DistinctIdAssociation, Element, Event, IngestBatch};

const DEMO_DAYS: i64 = 365;
const BROWSERS: &[&str] = &["Chrome", "Firefox", "Safari", "Edge"];
const PAGES: &[&str] = &["/", "/pricing", "/docs", "/blog", "/signup"];

/// Generator settings
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub team_id: i64,
    pub persons: usize,
    pub seed: u64,
}

impl DemoConfig {
    pub fn new(team_id: i64, persons: usize) -> Self {
        Self {
            team_id,
            persons,
            seed: 0x5eed,
        }
    }
}

/// Build a demo batch ending at `now`. Same seed, same batch.
pub fn generate(config: &DemoConfig, now: DateTime<Utc>) -> IngestBatch {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let start = now - Duration::days(DEMO_DAYS);
    let mut batch = IngestBatch::default();
    let mut next_assoc_id = 1;

    for p in 0..config.persons {
        let person_id = format!("person-{:04}", p);
        let primary = format!("user-{:04}", p);
        let first_seen = start + Duration::days(rng.gen_range(0..DEMO_DAYS));

        let mut distinct_ids = vec![primary.clone()];
        batch.associations.push(DistinctIdAssociation {
            id: next_assoc_id,
            team_id: config.team_id,
            distinct_id: primary,
            person_id: person_id.clone(),
            created_at: first_seen,
        });
        next_assoc_id += 1;

        // Anonymous device later merged into the same person
        if rng.gen_bool(0.3) {
            let anon = format!("anon-{:04}", p);
            let merged_at = first_seen + Duration::days(rng.gen_range(1..30));
            batch.associations.push(DistinctIdAssociation {
                id: next_assoc_id,
                team_id: config.team_id,
                distinct_id: anon.clone(),
                person_id: person_id.clone(),
                created_at: merged_at,
            });
            next_assoc_id += 1;
            distinct_ids.push(anon);
        }

        let active_days = rng.gen_range(1..=30);
        let browser = BROWSERS.choose(&mut rng).copied().unwrap_or("Chrome");
        for _ in 0..active_days {
            let remaining = (now - first_seen).num_minutes().max(1);
            let ts = first_seen + Duration::minutes(rng.gen_range(0..remaining));
            let distinct_id = distinct_ids
                .choose(&mut rng)
                .cloned()
                .unwrap_or_else(|| format!("user-{:04}", p));
            let page = PAGES.choose(&mut rng).copied().unwrap_or("/");

            batch.events.push(
                Event::new(config.team_id, distinct_id.clone(), "$pageview", ts)
                    .with_properties(json!({"$browser": browser, "$current_url": page})),
            );

            if rng.gen_bool(0.5) {
                batch.events.push(
                    Event::new(
                        config.team_id,
                        distinct_id.clone(),
                        "$autocapture",
                        ts + Duration::seconds(5),
                    )
                    .with_properties(json!({"$browser": browser, "$current_url": page}))
                    .with_elements(click_chain(&mut rng)),
                );
            }

            if rng.gen_bool(0.1) {
                let amount: f64 = rng.gen_range(5.0..250.0);
                batch.events.push(
                    Event::new(config.team_id, distinct_id, "purchase", ts + Duration::minutes(2))
                        .with_properties(json!({"amount": (amount * 100.0).round() / 100.0})),
                );
            }
        }
    }

    // Visitors that never identify
    for v in 0..config.persons / 10 {
        let ts = start + Duration::days(rng.gen_range(0..DEMO_DAYS));
        batch.events.push(
            Event::new(config.team_id, format!("visitor-{:04}", v), "$pageview", ts)
                .with_properties(json!({"$browser": "Chrome", "$current_url": "/"})),
        );
    }

    batch
}

/// Current person of every distinct id the batch associates
pub fn expected_mapping(batch: &IngestBatch) -> BTreeMap<String, String> {
    IdentityArena::from_associations(&batch.associations).into_mapping()
}

/// Number of expected entries the stored mapping disagrees with
pub fn diverged_ids(expected: &BTreeMap<String, String>, stored: &BTreeMap<String, String>) -> usize {
    expected
        .iter()
        .filter(|(distinct_id, person)| stored.get(*distinct_id) != Some(*person))
        .count()
}

/// Element chain of a click, innermost first
fn click_chain(rng: &mut StdRng) -> Vec<Element> {
    if rng.gen_bool(0.5) {
        vec![
            Element::tag("button")
                .with_text("Sign up")
                .with_classes(&["btn", "btn-primary"])
                .with_nth(1, 1),
            Element::tag("form").with_attr_id("signup"),
            Element::tag("body"),
        ]
    } else {
        vec![
            Element::tag("a").with_href("/pricing").with_text("Pricing").with_nth(2, 1),
            Element::tag("li").with_nth(2, 2),
            Element::tag("ul").with_classes(&["nav"]),
            Element::tag("body"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AnalyticsService;
    use crate::domain::{FixedClock, QueryService, TeamId};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_generate_is_deterministic() {
        let config = DemoConfig::new(3, 12);
        let a = generate(&config, now());
        let b = generate(&config, now());
        assert_eq!(a.events.len(), b.events.len());
        assert_eq!(a.associations, b.associations);
    }

    #[test]
    fn test_generated_rows_belong_to_team_and_window() {
        let batch = generate(&DemoConfig::new(3, 20), now());
        let start = now() - Duration::days(DEMO_DAYS);
        assert!(!batch.events.is_empty());
        for event in &batch.events {
            assert_eq!(event.team_id, 3);
            assert!(event.timestamp >= start);
        }
        assert!(batch.associations.iter().all(|a| a.team_id == 3));
        assert!(batch.element_count() > 0);
    }

    #[test]
    fn test_every_person_is_resolvable() {
        let batch = generate(&DemoConfig::new(1, 15), now());
        let mapping = expected_mapping(&batch);
        for p in 0..15 {
            assert_eq!(
                mapping.get(&format!("user-{:04}", p)),
                Some(&format!("person-{:04}", p))
            );
        }
        assert!(!mapping.contains_key("visitor-0000"));
    }

    #[test]
    fn test_diverged_ids_counts_mismatches() {
        let expected = BTreeMap::from([
            ("a".to_string(), "p1".to_string()),
            ("b".to_string(), "p2".to_string()),
            ("c".to_string(), "p3".to_string()),
        ]);
        let stored = BTreeMap::from([
            ("a".to_string(), "p1".to_string()),
            ("b".to_string(), "p9".to_string()),
            ("z".to_string(), "p4".to_string()),
        ]);
        assert_eq!(diverged_ids(&expected, &stored), 2);
        assert_eq!(diverged_ids(&expected, &expected), 0);
    }

    #[tokio::test]
    async fn test_ingested_demo_matches_expected_mapping() {
        let analytics = AnalyticsService::in_memory().await.unwrap();
        let svc = QueryService::with_clock(analytics.repository(), Box::new(FixedClock(now())));
        let team = TeamId::new(4).unwrap();
        let batch = generate(&DemoConfig::new(4, 25), now());
        let expected = expected_mapping(&batch);

        svc.ingest(team, &batch).await.unwrap();
        let stored = svc.latest_mapping(team).await.unwrap();

        assert_eq!(stored, expected);
        assert_eq!(diverged_ids(&expected, &stored), 0);
    }
}
