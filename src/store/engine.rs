//! Collection state and the operations the bundled stores share
//!
//! [`CollectionData`] is a plain value: the in-memory store mutates it under a
//! lock, the file store mutates a copy and only commits it once the snapshot
//! has been written.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::plan::{QueryPlan, ScanStage, WinningPlan};
use crate::error::{StoreError, StoreResult};
use crate::models::{Document, DocumentId, Filter, ID_FIELD};

/// Documents in insertion order plus the single-field index catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CollectionData {
    documents: Vec<Document>,
    /// field -> index name
    indexes: BTreeMap<String, String>,
}

impl CollectionData {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn insert(&mut self, mut document: Document) -> StoreResult<DocumentId> {
        if document.contains_key(ID_FIELD) {
            return Err(StoreError::operation(format!(
                "'{}' is assigned by the store and cannot be supplied",
                ID_FIELD
            )));
        }
        check_fields(&document)?;

        let id = DocumentId::new();
        document.set_id(id);
        self.documents.push(document);
        Ok(id)
    }

    /// Matching documents in insertion order; `limit == 0` means unbounded
    pub fn find(&self, filter: &Filter, limit: usize) -> StoreResult<Vec<Document>> {
        filter.validate()?;
        let matching = self.documents.iter().filter(|doc| filter.matches(doc));
        Ok(if limit > 0 {
            matching.take(limit).cloned().collect()
        } else {
            matching.cloned().collect()
        })
    }

    /// Merge `set` into the first or every matching document
    ///
    /// Returns the number of documents whose content actually changed.
    pub fn update(&mut self, filter: &Filter, set: &Document, multiple: bool) -> StoreResult<u64> {
        filter.validate()?;
        if set.keys().any(|k| k == ID_FIELD || k.starts_with(&format!("{}.", ID_FIELD))) {
            return Err(StoreError::operation(format!(
                "'{}' is immutable",
                ID_FIELD
            )));
        }
        check_fields(set)?;

        // Nothing is applied unless every matching document accepts the change
        let mut staged = Vec::new();
        for (position, document) in self.documents.iter().enumerate() {
            if !filter.matches(document) {
                continue;
            }
            let mut candidate = document.clone();
            let mut changed = false;
            for (path, value) in set.iter() {
                changed |= candidate.set_path(path, value.clone())?;
            }
            if changed {
                staged.push((position, candidate));
            }
            if !multiple {
                break;
            }
        }

        let modified = staged.len() as u64;
        for (position, candidate) in staged {
            self.documents[position] = candidate;
        }
        Ok(modified)
    }

    pub fn delete(&mut self, filter: &Filter, multiple: bool) -> StoreResult<u64> {
        filter.validate()?;
        let before = self.documents.len();
        if multiple {
            self.documents.retain(|doc| !filter.matches(doc));
        } else if let Some(position) = self.documents.iter().position(|doc| filter.matches(doc)) {
            self.documents.remove(position);
        }
        Ok((before - self.documents.len()) as u64)
    }

    /// Create an ascending single-field index; creating it again is a no-op
    pub fn create_index(&mut self, field: &str) -> StoreResult<String> {
        let field = field.trim();
        if field.is_empty() {
            return Err(StoreError::operation("index field name must not be empty"));
        }
        if field.starts_with('$') || field.split('.').any(str::is_empty) {
            return Err(StoreError::operation(format!(
                "invalid index field name '{}'",
                field
            )));
        }

        let name = self
            .indexes
            .entry(field.to_string())
            .or_insert_with(|| format!("{}_1", field));
        Ok(name.clone())
    }

    pub fn index_names(&self) -> Vec<String> {
        self.indexes.values().cloned().collect()
    }

    /// Plan a filter: an index scan when any equality field is indexed
    pub fn explain(&self, namespace: &str, filter: &Filter) -> StoreResult<QueryPlan> {
        filter.validate()?;
        let index_name = filter
            .equality_fields()
            .into_iter()
            .find_map(|field| self.indexes.get(field).cloned());

        let stage = if index_name.is_some() {
            ScanStage::IndexScan
        } else {
            ScanStage::CollectionScan
        };

        Ok(QueryPlan {
            namespace: namespace.to_string(),
            parsed_query: filter.criteria().clone(),
            winning_plan: WinningPlan { stage, index_name },
        })
    }
}

/// Field names must be non-empty and must not look like operators; values
/// must survive a JSON round trip, so NaN and infinities are refused
fn check_fields(document: &Document) -> StoreResult<()> {
    for (key, value) in document.iter() {
        if key.is_empty() || key.starts_with('$') {
            return Err(StoreError::operation(format!("invalid field name '{}'", key)));
        }
        if !value.is_finite() {
            return Err(StoreError::operation(format!(
                "field '{}' holds a non-finite number",
                key
            )));
        }
    }
    Ok(())
}
