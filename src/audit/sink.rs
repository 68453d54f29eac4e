//! Audit sinks
//!
//! [`AuditSink::append`] never fails from the caller's point of view. When
//! the durable write is rejected, the entry is handed to a [`FallbackLog`]
//! together with its serialized form so nothing is silently lost.

use std::sync::Arc;

use tracing::{error, trace};

use super::entry::AuditEntry;
use super::logger::AuditLogger;
use crate::error::{StoreError, StoreResult};
use crate::store::Collection;

/// Write-only destination for audit entries
pub trait AuditSink: Send + Sync {
    /// Persist an entry; failures are absorbed
    fn append(&self, entry: &AuditEntry);
}

/// Secondary, best-effort channel for entries that could not be persisted
pub trait FallbackLog: Send + Sync {
    fn record_failure(&self, error: &StoreError, serialized_entry: &str);
}

/// Reports persistence failures through the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFallback;

impl FallbackLog for TracingFallback {
    fn record_failure(&self, error: &StoreError, serialized_entry: &str) {
        error!(%error, entry = serialized_entry, "Failed to write audit log");
    }
}

/// Appends entries to the audit collection, optionally mirroring them locally
pub struct CollectionAuditSink {
    collection: Arc<dyn Collection>,
    mirror: Option<AuditLogger>,
    fallback: Arc<dyn FallbackLog>,
}

impl CollectionAuditSink {
    pub fn new(collection: Arc<dyn Collection>) -> Self {
        Self {
            collection,
            mirror: None,
            fallback: Arc::new(TracingFallback),
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackLog>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Also append every entry to a local JSON-lines file
    pub fn with_local_mirror(mut self, mirror: AuditLogger) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn mirror(&self) -> Option<&AuditLogger> {
        self.mirror.as_ref()
    }

    /// Durable write to the audit collection, surfacing the failure
    pub fn try_append(&self, entry: &AuditEntry) -> StoreResult<()> {
        let document = entry.to_document()?;
        self.collection
            .insert_one(document)
            .map(|id| trace!(id = %id, operation = %entry.operation, "Audit entry persisted"))
            .map_err(|e| StoreError::AuditPersistence(e.to_string()))
    }

    fn report(&self, error: StoreError, entry: &AuditEntry) {
        let serialized = serde_json::to_string(entry).unwrap_or_else(|_| format!("{:?}", entry));
        let error = match error {
            StoreError::AuditPersistence(_) => error,
            other => StoreError::AuditPersistence(other.to_string()),
        };
        self.fallback.record_failure(&error, &serialized);
    }
}

impl AuditSink for CollectionAuditSink {
    fn append(&self, entry: &AuditEntry) {
        if let Err(e) = self.try_append(entry) {
            self.report(e, entry);
        }
        if let Some(mirror) = &self.mirror {
            if let Err(e) = mirror.log(entry) {
                self.report(e, entry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::Operation;
    use crate::doc;
    use crate::models::{Document, DocumentId, Filter, Identity};
    use crate::store::{MemoryCollection, QueryPlan};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingFallback {
        failures: Mutex<Vec<(String, String)>>,
    }

    impl FallbackLog for RecordingFallback {
        fn record_failure(&self, error: &StoreError, serialized_entry: &str) {
            self.failures
                .lock()
                .unwrap()
                .push((error.to_string(), serialized_entry.to_string()));
        }
    }

    struct BrokenCollection;

    impl Collection for BrokenCollection {
        fn name(&self) -> &str {
            "audit_logs"
        }
        fn insert_one(&self, _: Document) -> StoreResult<DocumentId> {
            Err(StoreError::operation("disk full"))
        }
        fn find(&self, _: &Filter, _: usize) -> StoreResult<Vec<Document>> {
            Err(StoreError::operation("disk full"))
        }
        fn update_one(&self, _: &Filter, _: &Document) -> StoreResult<u64> {
            Err(StoreError::operation("disk full"))
        }
        fn update_many(&self, _: &Filter, _: &Document) -> StoreResult<u64> {
            Err(StoreError::operation("disk full"))
        }
        fn delete_one(&self, _: &Filter) -> StoreResult<u64> {
            Err(StoreError::operation("disk full"))
        }
        fn delete_many(&self, _: &Filter) -> StoreResult<u64> {
            Err(StoreError::operation("disk full"))
        }
        fn create_index(&self, _: &str) -> StoreResult<String> {
            Err(StoreError::operation("disk full"))
        }
        fn explain(&self, _: &Filter) -> StoreResult<QueryPlan> {
            Err(StoreError::operation("disk full"))
        }
    }

    fn entry() -> AuditEntry {
        AuditEntry::new(&Identity::user("alice").unwrap(), Operation::Create, "animals")
            .with_data(doc! { "name" => "Fido" })
            .with_result_count(1)
    }

    #[test]
    fn test_append_persists_to_collection() {
        let collection = Arc::new(MemoryCollection::new("aac", "audit_logs"));
        let sink = CollectionAuditSink::new(collection.clone());

        sink.append(&entry());

        let stored = collection.find(&Filter::all(), 0).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].get("operation").unwrap().as_str(), Some("CREATE"));
        assert_eq!(stored[0].get("user").unwrap().as_str(), Some("alice"));
        assert!(stored[0].get("timestamp").unwrap().as_str().is_some());
    }

    #[test]
    fn test_failure_goes_to_fallback() {
        let fallback = Arc::new(RecordingFallback::default());
        let sink = CollectionAuditSink::new(Arc::new(BrokenCollection))
            .with_fallback(fallback.clone());

        sink.append(&entry());

        let failures = fallback.failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].0.contains("disk full"));
        assert!(failures[0].1.contains("\"Fido\""));
    }

    #[test]
    fn test_local_mirror_receives_entries_even_when_collection_fails() {
        let temp = TempDir::new().unwrap();
        let mirror = AuditLogger::new(temp.path().join("audit.log"));
        let sink = CollectionAuditSink::new(Arc::new(BrokenCollection))
            .with_fallback(Arc::new(RecordingFallback::default()))
            .with_local_mirror(mirror);

        sink.append(&entry());

        let mirrored = sink.mirror().unwrap().read_all().unwrap();
        assert_eq!(mirrored.len(), 1);
        assert_eq!(mirrored[0].operation, Operation::Create);
    }

    #[test]
    fn test_try_append_surfaces_error() {
        let sink = CollectionAuditSink::new(Arc::new(BrokenCollection));
        let err = sink.try_append(&entry()).unwrap_err();
        assert!(matches!(err, StoreError::AuditPersistence(_)));
    }
}
