//! Team scope

use std::fmt;

use super::error::QueryError;

/// Tenancy boundary of every query. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TeamId(i64);

impl TeamId {
    pub fn new(id: i64) -> Result<Self, QueryError> {
        if id <= 0 {
            return Err(QueryError::Scope(format!(
                "team id must be positive, got {}",
                id
            )));
        }
        Ok(Self(id))
    }

    /// Fail closed when no team was supplied
    pub fn require(id: Option<i64>) -> Result<Self, QueryError> {
        match id {
            Some(id) => Self::new(id),
            None => Err(QueryError::Scope("team id is required".to_string())),
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_id_must_be_positive() {
        assert_eq!(TeamId::new(3).unwrap().get(), 3);
        assert!(matches!(TeamId::new(0), Err(QueryError::Scope(_))));
        assert!(matches!(TeamId::new(-7), Err(QueryError::Scope(_))));
    }

    #[test]
    fn test_require_fails_closed() {
        assert!(matches!(TeamId::require(None), Err(QueryError::Scope(_))));
        assert_eq!(TeamId::require(Some(9)).unwrap().to_string(), "9");
    }
}
