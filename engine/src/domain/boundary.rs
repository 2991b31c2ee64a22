//! Time boundary resolution
//!
//! The lower bound of an open-ended range is the team's first event, or the
//! start of the day a week before "now" when the team has no events yet.

use chrono::{DateTime, Duration, Utc};

use crate::core::constants::DEFAULT_LOOKBACK_DAYS;
use crate::utils::time::start_of_day;

/// Source of "now"
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Lower bound used when a team has no events
pub fn default_lower_bound(now: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(now - Duration::days(DEFAULT_LOOKBACK_DAYS))
}

/// Effective earliest timestamp given the stored minimum, if any
pub fn resolve_earliest(earliest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    earliest.unwrap_or_else(|| default_lower_bound(now))
}
