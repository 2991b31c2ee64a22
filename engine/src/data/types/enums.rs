//! Time bucketing enums shared by both backends

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Bucket size for stickiness aggregation.
///
/// Buckets are calendar-aligned in UTC: days start at 00:00, weeks start on
/// Monday, months start on the 1st.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(format!(
                "Unknown granularity '{}'. Valid options: day, week, month",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("Week".parse::<Granularity>(), Ok(Granularity::Week));
        assert_eq!(" month ".parse::<Granularity>(), Ok(Granularity::Month));
        assert!("hour".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Granularity::Month).unwrap();
        assert_eq!(json, "\"month\"");
        let parsed: Granularity = serde_json::from_str("\"day\"").unwrap();
        assert_eq!(parsed, Granularity::Day);
    }
}
