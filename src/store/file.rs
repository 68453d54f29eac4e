//! JSON-file-backed collection
//!
//! Each collection is one snapshot file. Mutations are applied to a copy of
//! the current state, the copy is written atomically, and only then does it
//! replace the in-memory state, so a failed write leaves both disk and memory
//! unchanged.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::engine::CollectionData;
use super::file_io::{read_json_or_default, write_json_atomic};
use super::plan::QueryPlan;
use super::Collection;
use crate::error::{StoreError, StoreResult};
use crate::models::{Document, DocumentId, Filter};

/// A collection persisted to `<dir>/<database>/<name>.json`
pub struct FileCollection {
    database: String,
    name: String,
    path: PathBuf,
    data: Mutex<CollectionData>,
}

impl FileCollection {
    /// Open (or lazily create) the snapshot for `database.name` under `root`
    pub fn open(root: &Path, database: &str, name: &str) -> StoreResult<Self> {
        let path = root.join(database).join(format!("{}.json", name));
        let data: CollectionData = read_json_or_default(&path)?;
        debug!(path = %path.display(), documents = data.len(), "Opened collection snapshot");

        Ok(Self {
            database: database.to_string(),
            name: name.to_string(),
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.name)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, CollectionData>> {
        self.data
            .lock()
            .map_err(|e| StoreError::operation(format!("Failed to acquire collection lock: {}", e)))
    }

    /// Apply `op` to a copy, persist it, then commit it
    fn mutate<T>(&self, op: impl FnOnce(&mut CollectionData) -> StoreResult<T>) -> StoreResult<T> {
        let mut current = self.lock()?;
        let mut next = current.clone();
        let result = op(&mut next)?;
        write_json_atomic(&self.path, &next)
            .map_err(|e| StoreError::operation(format!("Failed to persist {}: {}", self.namespace(), e)))?;
        *current = next;
        Ok(result)
    }
}

impl Collection for FileCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert_one(&self, document: Document) -> StoreResult<DocumentId> {
        self.mutate(|data| data.insert(document))
    }

    fn find(&self, filter: &Filter, limit: usize) -> StoreResult<Vec<Document>> {
        self.lock()?.find(filter, limit)
    }

    fn update_one(&self, filter: &Filter, set: &Document) -> StoreResult<u64> {
        self.mutate(|data| data.update(filter, set, false))
    }

    fn update_many(&self, filter: &Filter, set: &Document) -> StoreResult<u64> {
        self.mutate(|data| data.update(filter, set, true))
    }

    fn delete_one(&self, filter: &Filter) -> StoreResult<u64> {
        self.mutate(|data| data.delete(filter, false))
    }

    fn delete_many(&self, filter: &Filter) -> StoreResult<u64> {
        self.mutate(|data| data.delete(filter, true))
    }

    fn create_index(&self, field: &str) -> StoreResult<String> {
        self.mutate(|data| data.create_index(field))
    }

    fn explain(&self, filter: &Filter) -> StoreResult<QueryPlan> {
        self.lock()?.explain(&self.namespace(), filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use tempfile::TempDir;

    #[test]
    fn test_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let collection = FileCollection::open(temp_dir.path(), "aac", "animals").unwrap();
            collection.insert_one(doc! { "name" => "Fido" }).unwrap();
            collection.create_index("name").unwrap();
        }

        let reopened = FileCollection::open(temp_dir.path(), "aac", "animals").unwrap();
        let found = reopened.find(&Filter::new(doc! { "name" => "Fido" }), 0).unwrap();
        assert_eq!(found.len(), 1);

        let plan = reopened.explain(&Filter::new(doc! { "name" => "Fido" })).unwrap();
        assert!(plan.uses_index());
    }

    #[test]
    fn test_non_finite_value_keeps_snapshot_readable() {
        let temp_dir = TempDir::new().unwrap();
        {
            let collection = FileCollection::open(temp_dir.path(), "aac", "animals").unwrap();
            collection.insert_one(doc! { "name" => "Fido" }).unwrap();
            assert!(collection
                .insert_one(doc! { "name" => "Rex", "weight" => f64::NAN })
                .is_err());
            assert!(collection
                .update_one(&Filter::all(), &doc! { "weight" => f64::INFINITY })
                .is_err());
        }

        let reopened = FileCollection::open(temp_dir.path(), "aac", "animals").unwrap();
        let found = reopened.find(&Filter::all(), 0).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].get("weight").is_none());
    }

    #[test]
    fn test_snapshot_location() {
        let temp_dir = TempDir::new().unwrap();
        let collection = FileCollection::open(temp_dir.path(), "aac", "animals").unwrap();
        collection.insert_one(doc! { "name" => "Fido" }).unwrap();
        assert_eq!(collection.path(), temp_dir.path().join("aac").join("animals.json"));
        assert!(collection.path().exists());
    }

    #[test]
    fn test_failed_operation_leaves_state_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let collection = FileCollection::open(temp_dir.path(), "aac", "animals").unwrap();
        collection.insert_one(doc! { "name" => "Fido" }).unwrap();

        assert!(collection
            .update_many(&Filter::all(), &doc! { "_id" => "x" })
            .is_err());
        let found = collection.find(&Filter::all(), 0).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].id().is_some());
    }
}
