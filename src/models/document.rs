//! Schema-less documents
//!
//! A [`Document`] is an ordered mapping of field name to [`Value`]. Key order
//! is deterministic (sorted), which keeps serialized audit payloads stable.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::{DocumentId, ID_FIELD};
use super::value::Value;
use crate::error::{StoreError, StoreResult};

/// Build a [`Document`] from `key => value` pairs
///
/// ```rust,ignore
/// let dog = doc! { "name" => "Fido", "species" => "Dog", "age" => 4 };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::models::Document::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut document = $crate::models::Document::new();
        $( document.insert($key, $value); )+
        document
    }};
}

/// A mapping of field name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(BTreeMap<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field, returning the previous value if any
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Resolve a dotted path (`owner.name`) through nested mappings
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }

    /// Set a dotted path, creating intermediate mappings as needed
    ///
    /// Returns whether the document changed. Fails if an intermediate segment
    /// holds a non-mapping value.
    pub fn set_path(&mut self, path: &str, value: Value) -> StoreResult<bool> {
        match path.split_once('.') {
            None => {
                if self.0.get(path).is_some_and(|existing| *existing == value) {
                    return Ok(false);
                }
                self.0.insert(path.to_string(), value);
                Ok(true)
            }
            Some((head, rest)) => {
                let child = self
                    .0
                    .entry(head.to_string())
                    .or_insert_with(|| Value::Map(Document::new()));
                match child {
                    Value::Map(inner) => inner.set_path(rest, value),
                    other => Err(StoreError::operation(format!(
                        "cannot set '{}': field '{}' holds a {}",
                        path,
                        head,
                        other.kind()
                    ))),
                }
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// False when any value, at any depth, is a NaN or infinite float
    pub fn is_finite(&self) -> bool {
        self.0.values().all(Value::is_finite)
    }

    /// The store-assigned identifier, if this document has been persisted
    pub fn id(&self) -> Option<DocumentId> {
        self.0
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .and_then(|s| DocumentId::parse(s).ok())
    }

    pub(crate) fn set_id(&mut self, id: DocumentId) {
        self.0.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    }

    /// Convert from a JSON object
    pub fn from_json(json: serde_json::Value) -> StoreResult<Self> {
        match json {
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| Value::from_json(value).map(|v| (key, v)))
                .collect(),
            other => Err(StoreError::invalid(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    /// Parse a JSON object from text
    pub fn from_json_str(text: &str) -> StoreResult<Self> {
        let json: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| StoreError::invalid(format!("invalid JSON document: {}", e)))?;
        Self::from_json(json)
    }

    /// Convert into a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_doc_macro() {
        let dog = doc! { "name" => "Fido", "age" => 4 };
        assert_eq!(dog.len(), 2);
        assert_eq!(dog.get("name"), Some(&Value::from("Fido")));
        assert!(doc! {}.is_empty());
    }

    #[test]
    fn test_get_path() {
        let doc = Document::from_json(json!({"owner": {"name": "Alice", "address": {"city": "Oslo"}}}))
            .unwrap();
        assert_eq!(doc.get_path("owner.name"), Some(&Value::from("Alice")));
        assert_eq!(doc.get_path("owner.address.city"), Some(&Value::from("Oslo")));
        assert_eq!(doc.get_path("owner.phone"), None);
        assert_eq!(doc.get_path("owner.name.first"), None);
    }

    #[test]
    fn test_set_path_reports_change() {
        let mut doc = doc! { "name" => "Fido" };
        assert!(!doc.set_path("name", Value::from("Fido")).unwrap());
        assert!(doc.set_path("age", Value::from(5)).unwrap());
        assert!(doc.set_path("owner.name", Value::from("Bob")).unwrap());
        assert_eq!(doc.get_path("owner.name"), Some(&Value::from("Bob")));
    }

    #[test]
    fn test_set_path_through_scalar_fails() {
        let mut doc = doc! { "name" => "Fido" };
        let err = doc.set_path("name.first", Value::from("F")).unwrap_err();
        assert!(err.is_operation());
    }

    #[test]
    fn test_from_json_requires_object() {
        assert!(Document::from_json(json!([1, 2])).is_err());
        assert!(Document::from_json_str("not json").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_id_accessor() {
        let mut doc = doc! { "name" => "Fido" };
        assert!(doc.id().is_none());
        let id = DocumentId::new();
        doc.set_id(id);
        assert_eq!(doc.id(), Some(id));
    }

    #[test]
    fn test_serialization_is_sorted() {
        let doc = doc! { "species" => "Dog", "age" => 4, "name" => "Fido" };
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"age":4,"name":"Fido","species":"Dog"}"#);
    }
}
