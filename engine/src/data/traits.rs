//! Repository trait for event store backends
//!
//! The query service only talks to [`BehaviorRepository`]. DuckDB and
//! ClickHouse each implement it on top of the shared query shapes in
//! `data::queries`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::error::DataError;
use crate::data::types::{
    DistinctIdAssociation, ElementPredicate, Event, StickinessCount, StickinessParams,
};

/// Read and append operations over events, elements and identity associations
#[async_trait]
pub trait BehaviorRepository: Send + Sync {
    // ==================== Time Boundary ====================

    /// Timestamp of the team's first event, `None` when the team has no events
    async fn earliest_event_timestamp(
        &self,
        team_id: i64,
    ) -> Result<Option<DateTime<Utc>>, DataError>;

    // ==================== Identity ====================

    /// Current person of one distinct id
    async fn resolve_person(
        &self,
        team_id: i64,
        distinct_id: &str,
    ) -> Result<Option<String>, DataError>;

    /// `(distinct_id, person_id)` for every distinct id the team has seen
    async fn latest_mapping(&self, team_id: i64) -> Result<Vec<(String, String)>, DataError>;

    // ==================== Stickiness ====================

    /// Persons whose distinct active bucket count equals `target`, ascending
    async fn stickiness_people(
        &self,
        params: &StickinessParams,
        target: u64,
    ) -> Result<Vec<String>, DataError>;

    /// Persons per distinct active bucket count, ascending by count
    async fn stickiness_counts(
        &self,
        params: &StickinessParams,
    ) -> Result<Vec<StickinessCount>, DataError>;

    /// Window events whose distinct id has no association
    async fn count_unresolved_events(&self, params: &StickinessParams) -> Result<u64, DataError>;

    // ==================== Element Volume ====================

    /// Events matching every positional predicate
    async fn event_volume(
        &self,
        team_id: i64,
        predicates: &[ElementPredicate],
    ) -> Result<u64, DataError>;

    /// Volume of several independent predicate sequences, in input order
    async fn event_volumes(
        &self,
        team_id: i64,
        sequences: &[(String, Vec<ElementPredicate>)],
    ) -> Result<Vec<(String, u64)>, DataError> {
        let mut results = Vec::with_capacity(sequences.len());
        for (key, predicates) in sequences {
            let count = self.event_volume(team_id, predicates).await?;
            results.push((key.clone(), count));
        }
        Ok(results)
    }

    // ==================== Ingestion ====================

    /// Append events and their elements; returns the number of element rows
    async fn append_events(&self, events: &[Event]) -> Result<usize, DataError>;

    /// Append identity associations
    async fn append_associations(
        &self,
        associations: &[DistinctIdAssociation],
    ) -> Result<(), DataError>;
}
