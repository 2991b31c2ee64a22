//! BehaviorRepository trait implementation for ClickHouse
//!
//! ClickHouse operations are natively async so no spawn_blocking needed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::error::DataError;
use crate::data::traits::BehaviorRepository;
use crate::data::types::{
    DistinctIdAssociation, ElementPredicate, Event, StickinessCount, StickinessParams,
};
use crate::utils::time::micros_to_datetime;

use super::ClickhouseService;
use super::repositories::{behavior, ingest};

#[async_trait]
impl BehaviorRepository for Arc<ClickhouseService> {
    async fn earliest_event_timestamp(
        &self,
        team_id: i64,
    ) -> Result<Option<DateTime<Utc>>, DataError> {
        let micros = behavior::earliest_event_micros(self, team_id).await?;
        Ok(micros.map(micros_to_datetime))
    }

    async fn resolve_person(
        &self,
        team_id: i64,
        distinct_id: &str,
    ) -> Result<Option<String>, DataError> {
        behavior::resolve_person(self, team_id, distinct_id)
            .await
            .map_err(Into::into)
    }

    async fn latest_mapping(&self, team_id: i64) -> Result<Vec<(String, String)>, DataError> {
        behavior::latest_mapping(self, team_id)
            .await
            .map_err(Into::into)
    }

    async fn stickiness_people(
        &self,
        params: &StickinessParams,
        target: u64,
    ) -> Result<Vec<String>, DataError> {
        behavior::stickiness_people(self, params, target)
            .await
            .map_err(Into::into)
    }

    async fn stickiness_counts(
        &self,
        params: &StickinessParams,
    ) -> Result<Vec<StickinessCount>, DataError> {
        behavior::stickiness_counts(self, params)
            .await
            .map_err(Into::into)
    }

    async fn count_unresolved_events(&self, params: &StickinessParams) -> Result<u64, DataError> {
        behavior::unresolved_events(self, params)
            .await
            .map_err(Into::into)
    }

    async fn event_volume(
        &self,
        team_id: i64,
        predicates: &[ElementPredicate],
    ) -> Result<u64, DataError> {
        behavior::event_volume(self, team_id, predicates)
            .await
            .map_err(Into::into)
    }

    async fn event_volumes(
        &self,
        team_id: i64,
        sequences: &[(String, Vec<ElementPredicate>)],
    ) -> Result<Vec<(String, u64)>, DataError> {
        behavior::event_volumes(self, team_id, sequences)
            .await
            .map_err(Into::into)
    }

    async fn append_events(&self, events: &[Event]) -> Result<usize, DataError> {
        let client = self.client();
        self.with_timeout(ingest::insert_events(client, events))
            .await
            .map_err(Into::into)
    }

    async fn append_associations(
        &self,
        associations: &[DistinctIdAssociation],
    ) -> Result<(), DataError> {
        let client = self.client();
        self.with_timeout(ingest::insert_associations(client, associations))
            .await
            .map_err(Into::into)
    }
}
