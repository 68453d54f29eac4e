//! In-memory collection
//!
//! Holds documents behind a `RwLock`. Nothing is persisted; dropping the
//! collection drops its contents.

use std::sync::RwLock;

use super::engine::CollectionData;
use super::plan::QueryPlan;
use super::Collection;
use crate::error::{StoreError, StoreResult};
use crate::models::{Document, DocumentId, Filter};

/// A collection that lives only in process memory
pub struct MemoryCollection {
    database: String,
    name: String,
    data: RwLock<CollectionData>,
}

impl MemoryCollection {
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            name: name.into(),
            data: RwLock::new(CollectionData::default()),
        }
    }

    /// `database.collection`
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.name)
    }

    /// Number of stored documents
    pub fn count(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, CollectionData>> {
        self.data
            .read()
            .map_err(|e| StoreError::operation(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, CollectionData>> {
        self.data
            .write()
            .map_err(|e| StoreError::operation(format!("Failed to acquire write lock: {}", e)))
    }
}

impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert_one(&self, document: Document) -> StoreResult<DocumentId> {
        self.write()?.insert(document)
    }

    fn find(&self, filter: &Filter, limit: usize) -> StoreResult<Vec<Document>> {
        self.read()?.find(filter, limit)
    }

    fn update_one(&self, filter: &Filter, set: &Document) -> StoreResult<u64> {
        self.write()?.update(filter, set, false)
    }

    fn update_many(&self, filter: &Filter, set: &Document) -> StoreResult<u64> {
        self.write()?.update(filter, set, true)
    }

    fn delete_one(&self, filter: &Filter) -> StoreResult<u64> {
        self.write()?.delete(filter, false)
    }

    fn delete_many(&self, filter: &Filter) -> StoreResult<u64> {
        self.write()?.delete(filter, true)
    }

    fn create_index(&self, field: &str) -> StoreResult<String> {
        self.write()?.create_index(field)
    }

    fn explain(&self, filter: &Filter) -> StoreResult<QueryPlan> {
        self.read()?.explain(&self.namespace(), filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_round_trip_through_trait_object() {
        let collection: Arc<dyn Collection> = Arc::new(MemoryCollection::new("aac", "animals"));
        let id = collection
            .insert_one(doc! { "name" => "Fido", "species" => "Dog" })
            .unwrap();

        let found = collection
            .find(&Filter::new(doc! { "name" => "Fido" }), 0)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), Some(id));
        assert_eq!(collection.name(), "animals");
    }

    #[test]
    fn test_explain_namespace() {
        let collection = MemoryCollection::new("aac", "animals");
        let plan = collection.explain(&Filter::all()).unwrap();
        assert_eq!(plan.namespace, "aac.animals");
    }

    #[test]
    fn test_concurrent_inserts() {
        let collection = Arc::new(MemoryCollection::new("aac", "animals"));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let collection = Arc::clone(&collection);
                thread::spawn(move || {
                    collection.insert_one(doc! { "n" => i }).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(collection.count().unwrap(), 8);
    }
}
