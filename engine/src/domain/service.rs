//! Team-scoped query entry points
//!
//! Validates parameters, resolves defaults and delegates to the event store
//! through [`BehaviorRepository`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use super::boundary::{Clock, SystemClock, resolve_earliest};
use super::elements::{VolumeRequest, validate_volume_request};
use super::error::QueryError;
use super::stickiness::{StickinessQuery, StickinessRange};
use super::team::TeamId;
use crate::data::BehaviorRepository;
use crate::data::types::{IngestBatch, IngestSummary, StickinessCount, StickinessParams};

/// Behavioral query service
pub struct QueryService {
    repo: Box<dyn BehaviorRepository + Send + Sync>,
    clock: Box<dyn Clock>,
}

impl QueryService {
    pub fn new(repo: Box<dyn BehaviorRepository + Send + Sync>) -> Self {
        Self::with_clock(repo, Box::new(SystemClock))
    }

    pub fn with_clock(repo: Box<dyn BehaviorRepository + Send + Sync>, clock: Box<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Current time according to the service clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ==================== Time Boundary ====================

    /// First event of the team, or the start of the day a week ago when
    /// the team has no events
    pub async fn earliest_timestamp(&self, team: TeamId) -> Result<DateTime<Utc>, QueryError> {
        let earliest = self.repo.earliest_event_timestamp(team.get()).await?;
        let resolved = resolve_earliest(earliest, self.now());
        tracing::debug!(
            team_id = team.get(),
            has_events = earliest.is_some(),
            earliest = %resolved,
            "Resolved time boundary"
        );
        Ok(resolved)
    }

    // ==================== Identity ====================

    pub async fn resolve_current_person(
        &self,
        team: TeamId,
        distinct_id: &str,
    ) -> Result<Option<String>, QueryError> {
        if distinct_id.is_empty() {
            return Err(QueryError::validation("distinct_id", "must not be empty"));
        }
        Ok(self.repo.resolve_person(team.get(), distinct_id).await?)
    }

    /// Current person of every distinct id the team has seen
    pub async fn latest_mapping(&self, team: TeamId) -> Result<BTreeMap<String, String>, QueryError> {
        let rows = self.repo.latest_mapping(team.get()).await?;
        Ok(rows.into_iter().collect())
    }

    // ==================== Stickiness ====================

    /// Persons active in exactly `target_interval_count` buckets of the window
    pub async fn stickiness_people(
        &self,
        team: TeamId,
        query: &StickinessQuery,
    ) -> Result<BTreeSet<String>, QueryError> {
        let date_from = self.range_start(team, &query.range).await?;
        let (params, target) = query.resolve(team, date_from)?;

        self.warn_unresolved(&params).await?;
        let people = self.repo.stickiness_people(&params, target).await?;

        tracing::debug!(
            team_id = team.get(),
            granularity = %params.granularity,
            target,
            persons = people.len(),
            "Stickiness people query complete"
        );
        Ok(people.into_iter().collect())
    }

    /// Number of persons per distinct active bucket count
    pub async fn stickiness_counts(
        &self,
        team: TeamId,
        range: &StickinessRange,
    ) -> Result<Vec<StickinessCount>, QueryError> {
        let date_from = self.range_start(team, range).await?;
        let params = range.resolve(team, date_from)?;

        self.warn_unresolved(&params).await?;
        let counts = self.repo.stickiness_counts(&params).await?;

        tracing::debug!(
            team_id = team.get(),
            granularity = %params.granularity,
            rows = counts.len(),
            "Stickiness distribution query complete"
        );
        Ok(counts)
    }

    async fn range_start(
        &self,
        team: TeamId,
        range: &StickinessRange,
    ) -> Result<DateTime<Utc>, QueryError> {
        match range.date_from {
            Some(from) => Ok(from),
            None => self.earliest_timestamp(team).await,
        }
    }

    /// Report events dropped because their distinct id has no person
    async fn warn_unresolved(&self, params: &StickinessParams) -> Result<(), QueryError> {
        let unresolved = self.repo.count_unresolved_events(params).await?;
        if unresolved > 0 {
            tracing::warn!(
                team_id = params.team_id,
                unresolved_events = unresolved,
                "Events without an identified person excluded from stickiness"
            );
        }
        Ok(())
    }

    // ==================== Element Volume ====================

    /// Count events matching each key's positional predicates
    pub async fn volume(
        &self,
        team: TeamId,
        request: &VolumeRequest,
    ) -> Result<BTreeMap<String, u64>, QueryError> {
        validate_volume_request(request)?;
        let sequences: Vec<(String, Vec<_>)> = request
            .iter()
            .map(|(key, predicates)| (key.clone(), predicates.clone()))
            .collect();

        let volumes = self.repo.event_volumes(team.get(), &sequences).await?;
        tracing::debug!(
            team_id = team.get(),
            keys = volumes.len(),
            "Element volume query complete"
        );
        Ok(volumes.into_iter().collect())
    }

    // ==================== Ingestion ====================

    /// Append a batch. Every row must belong to `team`.
    pub async fn ingest(&self, team: TeamId, batch: &IngestBatch) -> Result<IngestSummary, QueryError> {
        let foreign_event = batch.events.iter().find(|e| e.team_id != team.get());
        let foreign_assoc = batch.associations.iter().find(|a| a.team_id != team.get());
        if let Some(team_id) = foreign_event
            .map(|e| e.team_id)
            .or(foreign_assoc.map(|a| a.team_id))
        {
            return Err(QueryError::Scope(format!(
                "batch row for team {} does not belong to team {}",
                team_id, team
            )));
        }

        let elements = self.repo.append_events(&batch.events).await?;
        self.repo.append_associations(&batch.associations).await?;

        let summary = IngestSummary {
            events: batch.events.len(),
            elements,
            associations: batch.associations.len(),
        };
        tracing::debug!(
            team_id = team.get(),
            events = summary.events,
            elements = summary.elements,
            associations = summary.associations,
            "Batch appended"
        );
        Ok(summary)
    }
}
