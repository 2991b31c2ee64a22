//! Filter type definitions
//!
//! Event filters restrict which events feed an aggregation: an optional event
//! name plus predicates over the event's JSON `properties`.

use serde::Deserialize;

use super::FilterError;
use crate::data::queries::builder::{ConditionBuilder, QueryParam};
use crate::data::sql::SqlDialect;
use crate::utils::sql::escape_like_pattern;

/// Predicate over one top-level property of an event
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyFilter {
    String {
        key: String,
        operator: StringOp,
        value: String,
    },
    Number {
        key: String,
        operator: NumberOp,
        value: f64,
    },
    StringOptions {
        key: String,
        operator: OptionsOp,
        value: Vec<String>,
    },
    Null {
        key: String,
        operator: NullOp,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum StringOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "starts_with")]
    StartsWith,
    #[serde(rename = "ends_with")]
    EndsWith,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum NumberOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum OptionsOp {
    #[serde(rename = "any of")]
    AnyOf,
    #[serde(rename = "none of")]
    NoneOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum NullOp {
    #[serde(rename = "is set", alias = "is not null")]
    IsSet,
    #[serde(rename = "is not set", alias = "is null")]
    IsNotSet,
}

impl PropertyFilter {
    pub fn key(&self) -> &str {
        match self {
            Self::String { key, .. } => key,
            Self::Number { key, .. } => key,
            Self::StringOptions { key, .. } => key,
            Self::Null { key, .. } => key,
        }
    }

    /// Reject filters that cannot address a property
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.key().trim().is_empty() {
            return Err(FilterError::InvalidKey(self.key().to_string()));
        }
        if let Self::Number { value, .. } = self
            && !value.is_finite()
        {
            return Err(FilterError::InvalidValue(format!(
                "number filter on '{}' must be finite",
                self.key()
            )));
        }
        Ok(())
    }

    /// SQL fragment over the JSON column `col` plus its parameters.
    ///
    /// The property key is bound as a JSON path parameter, never inlined.
    pub fn to_sql(&self, dialect: &dyn SqlDialect, col: &str) -> (String, Vec<QueryParam>) {
        let path = QueryParam::String(dialect.json_path(self.key()));
        match self {
            Self::String {
                operator, value, ..
            } => {
                let expr = dialect.json_extract_string(col);
                let (sql, pattern) = match operator {
                    StringOp::Eq => (format!("{} = ?", expr), value.clone()),
                    StringOp::Ne => (format!("{} != ?", expr), value.clone()),
                    StringOp::Contains => (
                        dialect.like_escaped(&expr),
                        format!("%{}%", escape_like_pattern(value)),
                    ),
                    StringOp::StartsWith => (
                        dialect.like_escaped(&expr),
                        format!("{}%", escape_like_pattern(value)),
                    ),
                    StringOp::EndsWith => (
                        dialect.like_escaped(&expr),
                        format!("%{}", escape_like_pattern(value)),
                    ),
                };
                (sql, vec![path, QueryParam::String(pattern)])
            }
            Self::Number {
                operator, value, ..
            } => {
                let op = match operator {
                    NumberOp::Eq => "=",
                    NumberOp::Gt => ">",
                    NumberOp::Lt => "<",
                    NumberOp::Gte => ">=",
                    NumberOp::Lte => "<=",
                };
                (
                    format!("{} {} ?", dialect.json_extract_number(col), op),
                    vec![path, QueryParam::Float64(*value)],
                )
            }
            Self::StringOptions {
                operator, value, ..
            } => {
                if value.is_empty() {
                    return ("1 = 1".to_string(), Vec::new());
                }
                let placeholders: Vec<&str> = value.iter().map(|_| "?").collect();
                let op = match operator {
                    OptionsOp::AnyOf => "IN",
                    OptionsOp::NoneOf => "NOT IN",
                };
                let mut params = vec![path];
                params.extend(value.iter().cloned().map(QueryParam::String));
                (
                    format!(
                        "{} {} ({})",
                        dialect.json_extract_string(col),
                        op,
                        placeholders.join(", ")
                    ),
                    params,
                )
            }
            Self::Null { operator, .. } => {
                let has = dialect.json_has(col);
                let sql = match operator {
                    NullOp::IsSet => has,
                    NullOp::IsNotSet => format!("NOT ({})", has),
                };
                (sql, vec![path])
            }
        }
    }
}

/// Restriction applied to events before any aggregation
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntityFilter {
    /// Event name; `None` matches every event
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyFilter>,
}

impl EntityFilter {
    pub fn event(name: impl Into<String>) -> Self {
        Self {
            event: Some(name.into()),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, filter: PropertyFilter) -> Self {
        self.properties.push(filter);
        self
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if let Some(ref event) = self.event
            && event.is_empty()
        {
            return Err(FilterError::InvalidValue(
                "event name must not be empty".to_string(),
            ));
        }
        self.properties.iter().try_for_each(PropertyFilter::validate)
    }

    /// Add this filter's conditions on the events table aliased as `alias`
    pub fn apply(&self, builder: &mut ConditionBuilder<'_>, alias: &str) {
        if let Some(ref event) = self.event {
            builder.add_eq(&format!("{}.event", alias), event.as_str());
        }
        let properties_col = format!("{}.properties", alias);
        for filter in &self.properties {
            let (sql, params) = filter.to_sql(builder.dialect(), &properties_col);
            builder.push(sql, params);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sql::{ClickhouseDialect, DuckdbDialect};

    fn string_filter(operator: StringOp, value: &str) -> PropertyFilter {
        PropertyFilter::String {
            key: "$browser".to_string(),
            operator,
            value: value.to_string(),
        }
    }

    #[test]
    fn string_filter_eq_binds_path_then_value() {
        let (sql, params) = string_filter(StringOp::Eq, "Chrome").to_sql(&DuckdbDialect, "properties");
        assert_eq!(sql, "json_extract_string(properties, ?) = ?");
        assert_eq!(
            params,
            vec![
                QueryParam::String("$.\"$browser\"".into()),
                QueryParam::String("Chrome".into())
            ]
        );
    }

    #[test]
    fn string_filter_contains_escapes_pattern() {
        let (sql, params) =
            string_filter(StringOp::Contains, "50%").to_sql(&DuckdbDialect, "properties");
        assert_eq!(sql, r"json_extract_string(properties, ?) LIKE ? ESCAPE '\'");
        assert_eq!(params[1], QueryParam::String("%50\\%%".into()));
    }

    #[test]
    fn string_filter_clickhouse() {
        let (sql, params) =
            string_filter(StringOp::StartsWith, "Chr").to_sql(&ClickhouseDialect, "e.properties");
        assert_eq!(sql, "JSONExtractString(e.properties, ?) LIKE ?");
        assert_eq!(
            params,
            vec![
                QueryParam::String("$browser".into()),
                QueryParam::String("Chr%".into())
            ]
        );
    }

    #[test]
    fn number_filter_all_operators() {
        let operators = [
            (NumberOp::Eq, "="),
            (NumberOp::Gt, ">"),
            (NumberOp::Lt, "<"),
            (NumberOp::Gte, ">="),
            (NumberOp::Lte, "<="),
        ];

        for (op, expected_op) in operators {
            let filter = PropertyFilter::Number {
                key: "price".to_string(),
                operator: op,
                value: 9.5,
            };
            let (sql, params) = filter.to_sql(&DuckdbDialect, "properties");
            assert_eq!(
                sql,
                format!(
                    "TRY_CAST(json_extract_string(properties, ?) AS DOUBLE) {} ?",
                    expected_op
                )
            );
            assert_eq!(params[1], QueryParam::Float64(9.5));
        }
    }

    #[test]
    fn string_options_none_of() {
        let filter = PropertyFilter::StringOptions {
            key: "plan".to_string(),
            operator: OptionsOp::NoneOf,
            value: vec!["free".to_string(), "trial".to_string()],
        };
        let (sql, params) = filter.to_sql(&ClickhouseDialect, "properties");
        assert_eq!(sql, "JSONExtractString(properties, ?) NOT IN (?, ?)");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn string_options_empty_is_noop() {
        let filter = PropertyFilter::StringOptions {
            key: "plan".to_string(),
            operator: OptionsOp::AnyOf,
            value: vec![],
        };
        let (sql, params) = filter.to_sql(&DuckdbDialect, "properties");
        assert_eq!(sql, "1 = 1");
        assert!(params.is_empty());
    }

    #[test]
    fn null_filter_is_not_set() {
        let filter = PropertyFilter::Null {
            key: "coupon".to_string(),
            operator: NullOp::IsNotSet,
        };
        let (sql, params) = filter.to_sql(&DuckdbDialect, "properties");
        assert_eq!(sql, "NOT (json_extract(properties, ?) IS NOT NULL)");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn null_op_accepts_aliases() {
        let filter: PropertyFilter =
            serde_json::from_str(r#"{"type": "null", "key": "coupon", "operator": "is null"}"#)
                .unwrap();
        assert_eq!(
            filter,
            PropertyFilter::Null {
                key: "coupon".to_string(),
                operator: NullOp::IsNotSet
            }
        );
    }

    #[test]
    fn entity_filter_applies_event_and_properties() {
        let filter = EntityFilter::event("purchase").with_property(PropertyFilter::Number {
            key: "amount".to_string(),
            operator: NumberOp::Gt,
            value: 10.0,
        });
        let mut builder = ConditionBuilder::new(&DuckdbDialect);
        filter.apply(&mut builder, "e");
        let (sql, params) = builder.finish();
        assert_eq!(
            sql,
            "e.event = ? AND TRY_CAST(json_extract_string(e.properties, ?) AS DOUBLE) > ?"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn entity_filter_validation() {
        assert!(EntityFilter::default().validate().is_ok());
        assert!(EntityFilter::event("").validate().is_err());
        let bad_key = EntityFilter::default().with_property(PropertyFilter::Null {
            key: " ".to_string(),
            operator: NullOp::IsSet,
        });
        assert!(matches!(bad_key.validate(), Err(FilterError::InvalidKey(_))));
    }
}
