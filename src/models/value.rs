//! Field values
//!
//! A closed set of value kinds a document field may hold. JSON `null` is not
//! part of the set, so every stored value has a definite kind.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::document::Document;
use crate::error::{StoreError, StoreResult};

/// A single field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Map(Document),
}

impl Value {
    /// Name of the value kind, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "sequence",
            Value::Map(_) => "mapping",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Document> {
        match self {
            Value::Map(doc) => Some(doc),
            _ => None,
        }
    }

    /// False when a float anywhere inside is NaN or infinite
    pub fn is_finite(&self) -> bool {
        match self {
            Value::Float(f) => f.is_finite(),
            Value::Array(items) => items.iter().all(Value::is_finite),
            Value::Map(doc) => doc.is_finite(),
            _ => true,
        }
    }

    /// Order two values of comparable kinds
    ///
    /// Integers and floats compare numerically with each other. Values of
    /// different kinds, sequences and mappings have no ordering.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Equality as filters see it: `5` and `5.0` are the same value
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match self.compare(other) {
            Some(ordering) => ordering == Ordering::Equal,
            None => self == other,
        }
    }

    /// Convert from an arbitrary JSON value, rejecting `null`
    pub fn from_json(json: serde_json::Value) -> StoreResult<Self> {
        match json {
            serde_json::Value::Null => Err(StoreError::invalid(
                "null is not a permitted field value",
            )),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Int(i)),
                None => n
                    .as_f64()
                    .map(Value::Float)
                    .ok_or_else(|| StoreError::invalid(format!("unrepresentable number {}", n))),
            },
            serde_json::Value::String(s) => Ok(Value::String(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Value::from_json)
                .collect::<StoreResult<Vec<_>>>()
                .map(Value::Array),
            serde_json::Value::Object(_) => Document::from_json(json).map(Value::Map),
        }
    }

    /// Convert into a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(doc) => doc.to_json(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Map(doc)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_comparison_across_kinds() {
        assert_eq!(Value::Int(5).compare(&Value::Float(5.0)), Some(Ordering::Equal));
        assert_eq!(Value::Float(2.5).compare(&Value::Int(3)), Some(Ordering::Less));
        assert!(Value::Int(5).loosely_equals(&Value::Float(5.0)));
    }

    #[test]
    fn test_mismatched_kinds_do_not_compare() {
        assert_eq!(Value::Int(1).compare(&Value::from("1")), None);
        assert!(!Value::Int(1).loosely_equals(&Value::from("1")));
    }

    #[test]
    fn test_from_json_rejects_null() {
        let err = Value::from_json(json!(null)).unwrap_err();
        assert!(err.is_invalid_argument());

        let err = Value::from_json(json!({"nested": [1, null]})).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_from_json_number_kinds() {
        assert_eq!(Value::from_json(json!(4)).unwrap(), Value::Int(4));
        assert_eq!(Value::from_json(json!(4.5)).unwrap(), Value::Float(4.5));
    }

    #[test]
    fn test_untagged_deserialization() {
        let value: Value = serde_json::from_str(r#"{"tags": ["a", "b"], "age": 3}"#).unwrap();
        let doc = value.as_map().unwrap();
        assert_eq!(doc.get("age"), Some(&Value::Int(3)));
        assert_eq!(doc.get("tags").unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_non_finite_floats_are_detected() {
        assert!(Value::Float(1.5).is_finite());
        assert!(!Value::Float(f64::NAN).is_finite());
        assert!(!Value::Array(vec![Value::Int(1), Value::Float(f64::INFINITY)]).is_finite());
        let nested = Value::Map(Document::new().with("weight", Value::Float(f64::NEG_INFINITY)));
        assert!(!nested.is_finite());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("Fido").to_string(), "Fido");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1,2]");
    }
}
