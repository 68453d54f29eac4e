//! Query filters
//!
//! A [`Filter`] is structurally a [`Document`] but describes a predicate.
//! Matching a whole collection requires the explicit [`Filter::all`]
//! sentinel; an empty criteria mapping on its own is treated as a mistake by
//! the repository.

use std::cmp::Ordering;

use super::document::Document;
use super::value::Value;
use crate::error::{StoreError, StoreResult};

/// Comparison operators accepted inside an operator mapping
const OPERATORS: &[&str] = &["$eq", "$ne", "$gt", "$gte", "$lt", "$lte", "$in", "$exists"];

/// A predicate over document fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    criteria: Document,
    match_all: bool,
}

impl Filter {
    /// Create a filter from a criteria mapping
    pub fn new(criteria: Document) -> Self {
        Self {
            criteria,
            match_all: false,
        }
    }

    /// Explicitly match every document in the collection
    pub fn all() -> Self {
        Self {
            criteria: Document::new(),
            match_all: true,
        }
    }

    /// Add an equality criterion
    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.criteria.insert(field, value);
        self
    }

    /// Parse a filter from JSON text
    pub fn from_json_str(text: &str) -> StoreResult<Self> {
        Document::from_json_str(text).map(Self::new)
    }

    pub fn criteria(&self) -> &Document {
        &self.criteria
    }

    /// True when no criteria are present, sentinel or not
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn is_match_all(&self) -> bool {
        self.match_all
    }

    /// Check that every operator mapping is one the bundled stores evaluate
    ///
    /// Failures are store-side rejections ([`StoreError::Operation`]), the
    /// same kind of error a remote server returns for a query it cannot run.
    pub fn validate(&self) -> StoreResult<()> {
        for (field, expected) in self.criteria.iter() {
            if field.starts_with('$') {
                return Err(StoreError::operation(format!(
                    "unsupported top-level operator '{}'",
                    field
                )));
            }
            let Some(ops) = operator_map(expected) else {
                continue;
            };
            if let Some(plain) = ops.keys().find(|k| !k.starts_with('$')) {
                return Err(StoreError::operation(format!(
                    "field '{}' mixes operators with the plain key '{}'",
                    field, plain
                )));
            }
            for (op, operand) in ops.iter() {
                if !OPERATORS.contains(&op.as_str()) {
                    return Err(StoreError::operation(format!(
                        "unsupported operator '{}' on field '{}'",
                        op, field
                    )));
                }
                if op == "$in" && operand.as_array().is_none() {
                    return Err(StoreError::operation(format!(
                        "'$in' on field '{}' requires a sequence",
                        field
                    )));
                }
                if op == "$exists" && operand.as_bool().is_none() {
                    return Err(StoreError::operation(format!(
                        "'$exists' on field '{}' requires a boolean",
                        field
                    )));
                }
            }
        }
        Ok(())
    }

    /// Evaluate the filter against a document
    pub fn matches(&self, document: &Document) -> bool {
        self.criteria.iter().all(|(field, expected)| {
            let actual = document.get_path(field);
            match operator_map(expected) {
                Some(ops) => ops
                    .iter()
                    .all(|(op, operand)| apply_operator(op, actual, operand)),
                None => actual.is_some_and(|a| value_matches(a, expected)),
            }
        })
    }

    /// Fields compared by equality, used when choosing an index
    pub fn equality_fields(&self) -> Vec<&str> {
        self.criteria
            .iter()
            .filter(|(_, expected)| match operator_map(expected) {
                Some(ops) => ops.contains_key("$eq") || ops.contains_key("$in"),
                None => true,
            })
            .map(|(field, _)| field.as_str())
            .collect()
    }
}

impl From<Document> for Filter {
    fn from(criteria: Document) -> Self {
        Self::new(criteria)
    }
}

/// A mapping with any `$`-prefixed key is an operator mapping
fn operator_map(value: &Value) -> Option<&Document> {
    let map = value.as_map()?;
    if map.keys().any(|k| k.starts_with('$')) {
        Some(map)
    } else {
        None
    }
}

/// Equality, where a sequence field matches if any element matches
fn value_matches(actual: &Value, expected: &Value) -> bool {
    if actual.loosely_equals(expected) {
        return true;
    }
    match actual {
        Value::Array(items) => items.iter().any(|item| item.loosely_equals(expected)),
        _ => false,
    }
}

fn apply_operator(op: &str, actual: Option<&Value>, operand: &Value) -> bool {
    match op {
        "$exists" => operand.as_bool().unwrap_or(false) == actual.is_some(),
        "$eq" => actual.is_some_and(|a| value_matches(a, operand)),
        "$ne" => !actual.is_some_and(|a| value_matches(a, operand)),
        "$in" => match (actual, operand.as_array()) {
            (Some(a), Some(options)) => options.iter().any(|o| value_matches(a, o)),
            _ => false,
        },
        "$gt" => compares(actual, operand, |o| o == Ordering::Greater),
        "$gte" => compares(actual, operand, |o| o != Ordering::Less),
        "$lt" => compares(actual, operand, |o| o == Ordering::Less),
        "$lte" => compares(actual, operand, |o| o != Ordering::Greater),
        _ => false,
    }
}

fn compares(actual: Option<&Value>, operand: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    actual
        .and_then(|a| a.compare(operand))
        .is_some_and(accept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use serde_json::json;

    fn fido() -> Document {
        Document::from_json(json!({
            "name": "Fido",
            "species": "Dog",
            "age": 4,
            "tags": ["friendly", "trained"],
            "owner": {"name": "Alice"}
        }))
        .unwrap()
    }

    #[test]
    fn test_equality_match() {
        assert!(Filter::new(doc! { "species" => "Dog" }).matches(&fido()));
        assert!(!Filter::new(doc! { "species" => "Cat" }).matches(&fido()));
        assert!(Filter::new(doc! { "age" => 4.0 }).matches(&fido()));
    }

    #[test]
    fn test_nested_and_sequence_match() {
        assert!(Filter::new(doc! { "owner.name" => "Alice" }).matches(&fido()));
        assert!(Filter::new(doc! { "tags" => "trained" }).matches(&fido()));
        assert!(!Filter::new(doc! { "tags" => "aggressive" }).matches(&fido()));
    }

    #[test]
    fn test_operators() {
        let older = Filter::from_json_str(r#"{"age": {"$gte": 4}}"#).unwrap();
        assert!(older.matches(&fido()));

        let younger = Filter::from_json_str(r#"{"age": {"$lt": 4}}"#).unwrap();
        assert!(!younger.matches(&fido()));

        let either = Filter::from_json_str(r#"{"species": {"$in": ["Cat", "Dog"]}}"#).unwrap();
        assert!(either.matches(&fido()));

        let missing = Filter::from_json_str(r#"{"breed": {"$exists": false}}"#).unwrap();
        assert!(missing.matches(&fido()));

        let not_cat = Filter::from_json_str(r#"{"species": {"$ne": "Cat"}}"#).unwrap();
        assert!(not_cat.matches(&fido()));
    }

    #[test]
    fn test_validate_rejects_unknown_operator() {
        let filter = Filter::from_json_str(r#"{"age": {"$regex": "4"}}"#).unwrap();
        assert!(filter.validate().unwrap_err().is_operation());

        let filter = Filter::from_json_str(r#"{"$where": "1"}"#).unwrap();
        assert!(filter.validate().unwrap_err().is_operation());

        let filter = Filter::from_json_str(r#"{"age": {"$in": 4}}"#).unwrap();
        assert!(filter.validate().is_err());

        let filter = Filter::from_json_str(r#"{"age": {"$exists": "yes"}}"#).unwrap();
        assert!(filter.validate().is_err());
    }

    #[test]
    fn test_mixed_operator_mapping() {
        let mixed = Filter::from_json_str(r#"{"age": {"$gt": 3, "x": 1}}"#).unwrap();
        let err = mixed.validate().unwrap_err();
        assert!(err.is_operation());
        assert!(err.to_string().contains("'x'"));

        // A mapping without operators is still compared by equality
        let owner = Filter::from_json_str(r#"{"owner": {"name": "Alice"}}"#).unwrap();
        assert!(owner.validate().is_ok());
        assert!(owner.matches(&fido()));
    }

    #[test]
    fn test_match_all_sentinel() {
        let all = Filter::all();
        assert!(all.is_empty());
        assert!(all.is_match_all());
        assert!(all.matches(&fido()));

        let empty = Filter::new(Document::new());
        assert!(empty.is_empty());
        assert!(!empty.is_match_all());
    }

    #[test]
    fn test_equality_fields() {
        let filter = Filter::from_json_str(r#"{"species": "Dog", "age": {"$gt": 2}}"#).unwrap();
        assert_eq!(filter.equality_fields(), vec!["species"]);
    }
}
