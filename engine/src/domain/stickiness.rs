//! Stickiness query parameters and validation
//!
//! A stickiness query counts, per person, the distinct time buckets in which
//! the person performed a matching event. The people query keeps persons
//! whose count equals the target exactly; the range query returns the whole
//! distribution.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::error::QueryError;
use super::team::TeamId;
use crate::data::filters::EntityFilter;
use crate::data::types::{Granularity, StickinessParams};

/// Window and filter of a stickiness aggregation
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StickinessRange {
    #[serde(default)]
    pub filter: EntityFilter,
    /// Inclusive lower bound; `None` means the team's earliest event
    #[serde(default)]
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub date_to: DateTime<Utc>,
    #[serde(default)]
    pub granularity: Granularity,
}

impl StickinessRange {
    pub fn new(date_to: DateTime<Utc>, granularity: Granularity) -> Self {
        Self {
            filter: EntityFilter::default(),
            date_from: None,
            date_to,
            granularity,
        }
    }

    pub fn from(mut self, date_from: DateTime<Utc>) -> Self {
        self.date_from = Some(date_from);
        self
    }

    pub fn with_filter(mut self, filter: EntityFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Validate against the resolved lower bound and build repository params
    pub(crate) fn resolve(
        &self,
        team: TeamId,
        date_from: DateTime<Utc>,
    ) -> Result<StickinessParams, QueryError> {
        if date_from > self.date_to {
            return Err(QueryError::validation(
                "date_from",
                format!(
                    "{} is after date_to {}",
                    date_from.to_rfc3339(),
                    self.date_to.to_rfc3339()
                ),
            ));
        }
        self.filter.validate()?;

        Ok(StickinessParams {
            team_id: team.get(),
            filter: self.filter.clone(),
            date_from,
            date_to: self.date_to,
            granularity: self.granularity,
        })
    }
}

/// Stickiness people query: persons active in exactly `target_interval_count` buckets
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StickinessQuery {
    #[serde(flatten)]
    pub range: StickinessRange,
    pub target_interval_count: u32,
}

impl StickinessQuery {
    pub fn new(range: StickinessRange, target_interval_count: u32) -> Self {
        Self {
            range,
            target_interval_count,
        }
    }

    /// Validate and build repository params plus the exact target
    pub(crate) fn resolve(
        &self,
        team: TeamId,
        date_from: DateTime<Utc>,
    ) -> Result<(StickinessParams, u64), QueryError> {
        let params = self.range.resolve(team, date_from)?;
        let target = u64::from(self.target_interval_count);
        if target == 0 {
            return Err(QueryError::validation(
                "target_interval_count",
                "must be at least 1",
            ));
        }
        Ok((params, target))
    }
}

/// Parse a granularity name into the validation error shape
pub fn parse_granularity(value: &str) -> Result<Granularity, QueryError> {
    value
        .parse()
        .map_err(|message: String| QueryError::validation("granularity", message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, d, 0, 0, 0).unwrap()
    }

    fn team() -> TeamId {
        TeamId::new(1).unwrap()
    }

    #[test]
    fn test_reversed_range_rejected() {
        let range = StickinessRange::new(day(3), Granularity::Day);
        let err = range.resolve(team(), day(5)).unwrap_err();
        assert!(matches!(err, QueryError::Validation { field: "date_from", .. }));
    }

    #[test]
    fn test_zero_target_rejected() {
        let query = StickinessQuery::new(StickinessRange::new(day(7), Granularity::Day), 0);
        let err = query.resolve(team(), day(1)).unwrap_err();
        assert!(matches!(
            err,
            QueryError::Validation { field: "target_interval_count", .. }
        ));
    }

    #[test]
    fn test_target_beyond_window_accepted() {
        // 1st..7th spans 7 day buckets; K=8 is unreachable but well-formed
        let range = StickinessRange::new(day(7), Granularity::Day);
        let (_, target) = StickinessQuery::new(range, 8).resolve(team(), day(1)).unwrap();
        assert_eq!(target, 8);
    }

    #[test]
    fn test_resolve_carries_window_and_filter() {
        let range = StickinessRange::new(day(10), Granularity::Week)
            .with_filter(EntityFilter::event("$pageview"));
        let (params, target) = StickinessQuery::new(range, 1)
            .resolve(team(), day(4))
            .unwrap();
        assert_eq!(params.team_id, 1);
        assert_eq!(params.date_from, day(4));
        assert_eq!(params.granularity, Granularity::Week);
        assert_eq!(params.filter.event.as_deref(), Some("$pageview"));
        assert_eq!(target, 1);
    }

    #[test]
    fn test_empty_event_name_rejected() {
        let range = StickinessRange::new(day(10), Granularity::Day)
            .with_filter(EntityFilter::event(""));
        assert!(matches!(
            range.resolve(team(), day(1)),
            Err(QueryError::Validation { field: "filters", .. })
        ));
    }

    #[test]
    fn test_parse_granularity() {
        assert_eq!(parse_granularity("Week").unwrap(), Granularity::Week);
        assert!(matches!(
            parse_granularity("hour"),
            Err(QueryError::Validation { field: "granularity", .. })
        ));
    }

    #[test]
    fn test_query_deserializes_flat() {
        let query: StickinessQuery = serde_json::from_str(
            r#"{"date_to": "2021-01-07T00:00:00Z", "granularity": "day", "target_interval_count": 3,
                "filter": {"event": "$pageview"}}"#,
        )
        .unwrap();
        assert_eq!(query.target_interval_count, 3);
        assert_eq!(query.range.date_from, None);
        assert_eq!(query.range.filter.event.as_deref(), Some("$pageview"));
    }
}
