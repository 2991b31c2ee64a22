//! Ordered element predicates
//!
//! A volume request maps each query key to a sequence of predicates. The
//! predicate at index `i` constrains the element at `order_index = i` of an
//! event; an event counts once all positions are satisfied.
//!
//! ## JSON form
//!
//! ```json
//! {
//!   "signup": [{"tag_name": "button", "attr_class": ["btn", "primary"]}, {"tag_name": "form"}],
//!   "nav":    [{"href": "/pricing"}]
//! }
//! ```

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::error::QueryError;
use crate::core::constants::{MAX_FILTER_JSON_SIZE, VOLUME_MAX_POSITIONS, VOLUME_MAX_QUERY_KEYS};
use crate::data::types::{ElementAttribute, ElementPredicate};

/// Query key -> positional predicates
pub type VolumeRequest = BTreeMap<String, Vec<ElementPredicate>>;

/// Parse and validate a volume request from JSON
pub fn parse_volume_request(json: &str) -> Result<VolumeRequest, QueryError> {
    if json.len() > MAX_FILTER_JSON_SIZE {
        return Err(QueryError::validation(
            "query",
            format!("exceeds maximum size of {} bytes", MAX_FILTER_JSON_SIZE),
        ));
    }
    let value: Value = serde_json::from_str(json)
        .map_err(|e| QueryError::validation("query", format!("invalid JSON: {}", e)))?;
    let Value::Object(keys) = value else {
        return Err(QueryError::validation(
            "query",
            "expected an object of query keys",
        ));
    };

    let mut request = VolumeRequest::new();
    for (key, positions) in keys {
        let Value::Array(positions) = positions else {
            return Err(QueryError::validation(
                "query",
                format!("'{}' must be an array of predicates", key),
            ));
        };
        let predicates = positions
            .iter()
            .map(parse_predicate)
            .collect::<Result<Vec<_>, _>>()?;
        request.insert(key, predicates);
    }

    validate_volume_request(&request)?;
    Ok(request)
}

/// Enforce the request limits
pub fn validate_volume_request(request: &VolumeRequest) -> Result<(), QueryError> {
    if request.len() > VOLUME_MAX_QUERY_KEYS {
        return Err(QueryError::validation(
            "query",
            format!("at most {} query keys allowed", VOLUME_MAX_QUERY_KEYS),
        ));
    }
    for (key, predicates) in request {
        if predicates.len() > VOLUME_MAX_POSITIONS {
            return Err(QueryError::validation(
                "query",
                format!(
                    "'{}' has {} positions; at most {} allowed",
                    key,
                    predicates.len(),
                    VOLUME_MAX_POSITIONS
                ),
            ));
        }
    }
    Ok(())
}

fn parse_predicate(value: &Value) -> Result<ElementPredicate, QueryError> {
    let Value::Object(fields) = value else {
        return Err(QueryError::validation(
            "predicate",
            "each position must be an object",
        ));
    };
    parse_attributes(fields).map(ElementPredicate::new)
}

fn parse_attributes(fields: &Map<String, Value>) -> Result<Vec<ElementAttribute>, QueryError> {
    fields
        .iter()
        .map(|(name, value)| parse_attribute(name, value))
        .collect()
}

fn parse_attribute(name: &str, value: &Value) -> Result<ElementAttribute, QueryError> {
    let attribute = match name {
        "tag_name" => ElementAttribute::TagName(expect_string(name, value)?),
        "text" => ElementAttribute::Text(expect_string(name, value)?),
        "href" => ElementAttribute::Href(expect_string(name, value)?),
        "attr_id" => ElementAttribute::AttrId(expect_string(name, value)?),
        "attr_class" => ElementAttribute::AttrClass(expect_classes(value)?),
        "nth_child" => ElementAttribute::NthChild(expect_int(name, value)?),
        "nth_of_type" => ElementAttribute::NthOfType(expect_int(name, value)?),
        other => {
            return Err(QueryError::validation(
                "predicate",
                format!(
                    "unknown element attribute '{}'. Valid options: tag_name, text, href, attr_id, attr_class, nth_child, nth_of_type",
                    other
                ),
            ));
        }
    };
    Ok(attribute)
}

fn expect_string(name: &str, value: &Value) -> Result<String, QueryError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| QueryError::validation("predicate", format!("'{}' must be a string", name)))
}

fn expect_int(name: &str, value: &Value) -> Result<i64, QueryError> {
    value
        .as_i64()
        .ok_or_else(|| QueryError::validation("predicate", format!("'{}' must be an integer", name)))
}

/// `attr_class` accepts one class or a list of classes
fn expect_classes(value: &Value) -> Result<Vec<String>, QueryError> {
    match value {
        Value::String(class) => Ok(vec![class.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| expect_string("attr_class", item))
            .collect(),
        _ => Err(QueryError::validation(
            "predicate",
            "'attr_class' must be a string or a list of strings",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positional_predicates() {
        let request = parse_volume_request(
            r#"{"A": [{"tag_name": "a", "href": "/a"}, {"tag_name": "li", "nth_child": 2}],
                "B": [{"attr_class": "btn"}]}"#,
        )
        .unwrap();

        assert_eq!(request.len(), 2);
        assert_eq!(
            request["A"][0].attributes,
            vec![
                ElementAttribute::TagName("a".to_string()),
                ElementAttribute::Href("/a".to_string()),
            ]
        );
        assert_eq!(
            request["A"][1].attributes[1],
            ElementAttribute::NthChild(2)
        );
        assert_eq!(
            request["B"][0].attributes,
            vec![ElementAttribute::AttrClass(vec!["btn".to_string()])]
        );
    }

    #[test]
    fn test_empty_predicate_and_empty_sequence() {
        let request = parse_volume_request(r#"{"any": [], "first": [{}]}"#).unwrap();
        assert!(request["any"].is_empty());
        assert!(request["first"][0].is_empty());
    }

    #[test]
    fn test_class_list() {
        let request = parse_volume_request(r#"{"k": [{"attr_class": ["a", "b"]}]}"#).unwrap();
        assert_eq!(
            request["k"][0].attributes,
            vec![ElementAttribute::AttrClass(vec![
                "a".to_string(),
                "b".to_string()
            ])]
        );
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let err = parse_volume_request(r#"{"k": [{"onclick": "x"}]}"#).unwrap_err();
        assert!(matches!(err, QueryError::Validation { field: "predicate", .. }));
        assert!(err.to_string().contains("onclick"));
    }

    #[test]
    fn test_wrong_value_types_rejected() {
        assert!(parse_volume_request(r#"{"k": [{"nth_child": "2"}]}"#).is_err());
        assert!(parse_volume_request(r#"{"k": [{"tag_name": 1}]}"#).is_err());
        assert!(parse_volume_request(r#"{"k": [{"attr_class": [1]}]}"#).is_err());
        assert!(parse_volume_request(r#"{"k": {"tag_name": "a"}}"#).is_err());
        assert!(parse_volume_request(r#"[{"tag_name": "a"}]"#).is_err());
    }

    #[test]
    fn test_limits() {
        let keys: Map<String, Value> = (0..=VOLUME_MAX_QUERY_KEYS)
            .map(|i| (format!("k{}", i), Value::Array(vec![])))
            .collect();
        let json = Value::Object(keys).to_string();
        assert!(parse_volume_request(&json).is_err());

        let positions = vec![serde_json::json!({}); VOLUME_MAX_POSITIONS + 1];
        let json = serde_json::json!({ "deep": positions }).to_string();
        assert!(parse_volume_request(&json).is_err());

        let positions = vec![serde_json::json!({}); VOLUME_MAX_POSITIONS];
        let json = serde_json::json!({ "deep": positions }).to_string();
        assert!(parse_volume_request(&json).is_ok());
    }
}
