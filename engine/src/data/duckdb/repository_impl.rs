//! BehaviorRepository trait implementation for DuckDB
//!
//! Implemented for `Arc<DuckdbService>` rather than `DuckdbService` because
//! the connection guard is not Send: the Arc is cloned into each
//! spawn_blocking closure and the connection is locked inside it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::error::DataError;
use crate::data::traits::BehaviorRepository;
use crate::data::types::{
    DistinctIdAssociation, ElementPredicate, Event, StickinessCount, StickinessParams,
};
use crate::utils::time::micros_to_datetime;

use super::DuckdbService;
use super::repositories::{behavior, ingest};

#[async_trait]
impl BehaviorRepository for Arc<DuckdbService> {
    async fn earliest_event_timestamp(
        &self,
        team_id: i64,
    ) -> Result<Option<DateTime<Utc>>, DataError> {
        let micros = self
            .run_query(move |conn| behavior::earliest_event_micros(conn, team_id))
            .await?;
        Ok(micros.map(micros_to_datetime))
    }

    async fn resolve_person(
        &self,
        team_id: i64,
        distinct_id: &str,
    ) -> Result<Option<String>, DataError> {
        let did = distinct_id.to_string();
        self.run_query(move |conn| behavior::resolve_person(conn, team_id, &did))
            .await
            .map_err(Into::into)
    }

    async fn latest_mapping(&self, team_id: i64) -> Result<Vec<(String, String)>, DataError> {
        self.run_query(move |conn| behavior::latest_mapping(conn, team_id))
            .await
            .map_err(Into::into)
    }

    async fn stickiness_people(
        &self,
        params: &StickinessParams,
        target: u64,
    ) -> Result<Vec<String>, DataError> {
        let params = params.clone();
        self.run_query(move |conn| behavior::stickiness_people(conn, &params, target))
            .await
            .map_err(Into::into)
    }

    async fn stickiness_counts(
        &self,
        params: &StickinessParams,
    ) -> Result<Vec<StickinessCount>, DataError> {
        let params = params.clone();
        self.run_query(move |conn| behavior::stickiness_counts(conn, &params))
            .await
            .map_err(Into::into)
    }

    async fn count_unresolved_events(&self, params: &StickinessParams) -> Result<u64, DataError> {
        let params = params.clone();
        self.run_query(move |conn| behavior::unresolved_events(conn, &params))
            .await
            .map_err(Into::into)
    }

    async fn event_volume(
        &self,
        team_id: i64,
        predicates: &[ElementPredicate],
    ) -> Result<u64, DataError> {
        let predicates = predicates.to_vec();
        self.run_query(move |conn| behavior::event_volume(conn, team_id, &predicates))
            .await
            .map_err(Into::into)
    }

    async fn append_events(&self, events: &[Event]) -> Result<usize, DataError> {
        let events = events.to_vec();
        self.run_query(move |conn| ingest::append_events(conn, &events))
            .await
            .map_err(Into::into)
    }

    async fn append_associations(
        &self,
        associations: &[DistinctIdAssociation],
    ) -> Result<(), DataError> {
        let associations = associations.to_vec();
        self.run_query(move |conn| ingest::append_associations(conn, &associations))
            .await
            .map_err(Into::into)
    }
}
