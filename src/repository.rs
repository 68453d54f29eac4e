//! The audited repository
//!
//! Wraps CRUD against one primary collection. Every attempted operation is
//! attributed to an explicit caller and recorded through an [`AuditSink`];
//! store failures are absorbed into the audit trail and a "no effect" return
//! value. Only [`StoreError::InvalidArgument`] ever reaches the caller, and
//! it is raised before any store call or audit write.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::audit::{AuditEntry, AuditLogger, AuditSink, CollectionAuditSink, Operation};
use crate::config::{Settings, StorePaths};
use crate::error::{StoreError, StoreResult};
use crate::inspect::QueryPlanInspector;
use crate::models::{Document, Filter, Identity, Value};
use crate::store::{Collection, ConnectionProvider};

/// Result of creating one index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// Index name assigned by the store
    Created(String),
    /// Why the store refused
    Failed(String),
}

impl IndexOutcome {
    pub fn index_name(&self) -> Option<&str> {
        match self {
            IndexOutcome::Created(name) => Some(name),
            IndexOutcome::Failed(_) => None,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, IndexOutcome::Created(_))
    }
}

/// CRUD with mandatory caller attribution and a forensic audit trail
pub struct AuditedRepository {
    collection: Arc<dyn Collection>,
    sink: Arc<dyn AuditSink>,
    inspector: QueryPlanInspector,
    admin: Identity,
}

impl AuditedRepository {
    pub fn new(collection: Arc<dyn Collection>, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            inspector: QueryPlanInspector::new(Arc::clone(&collection)),
            collection,
            sink,
            admin: Identity::default(),
        }
    }

    /// Wire a repository from a provider and the deployment settings
    pub fn from_provider(
        provider: &dyn ConnectionProvider,
        settings: &Settings,
        paths: &StorePaths,
    ) -> StoreResult<Self> {
        let mut sink = CollectionAuditSink::new(provider.audit_collection());
        if settings.write_local_audit {
            sink = sink.with_local_mirror(AuditLogger::new(settings.local_audit_file(paths)));
        }

        let collection = provider.primary_collection();
        let inspector = QueryPlanInspector::new(Arc::clone(&collection))
            .with_timeout(settings.explain_timeout());

        Ok(Self::new(collection, Arc::new(sink))
            .with_inspector(inspector)
            .with_admin_identity(settings.admin()?))
    }

    pub fn with_inspector(mut self, inspector: QueryPlanInspector) -> Self {
        self.inspector = inspector;
        self
    }

    /// Identity recorded for index management
    pub fn with_admin_identity(mut self, admin: Identity) -> Self {
        self.admin = admin;
        self
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    pub fn admin_identity(&self) -> &Identity {
        &self.admin
    }

    /// Insert one document; `false` if the store rejected it
    pub fn create(&self, user: &str, document: Document) -> StoreResult<bool> {
        let caller = Identity::user(user)?;
        if document.is_empty() {
            return Err(StoreError::invalid("document must not be empty"));
        }

        let mut data = document.clone();
        match self.collection.insert_one(document) {
            Ok(id) => {
                data.set_id(id);
                self.record(
                    self.entry(&caller, Operation::Create)
                        .with_data(data)
                        .with_result_count(1),
                );
                info!(user = %caller, id = %id, "CREATE by {} succeeded", caller);
                Ok(true)
            }
            Err(e) => {
                self.record(
                    self.entry(&caller, Operation::Create)
                        .with_data(data)
                        .with_error(e.to_string()),
                );
                error!(user = %caller, error = %e, "CREATE by {} failed", caller);
                Ok(false)
            }
        }
    }

    /// Documents matching `filter`, at most `limit` when `limit > 0`
    ///
    /// Writes `READ_REQUEST` before touching the store, then exactly one of
    /// `READ_RESULT` (with plan metadata) or `READ_ERROR`.
    pub fn read(&self, user: &str, filter: &Filter, limit: usize) -> StoreResult<Vec<Document>> {
        let caller = Identity::user(user)?;
        if filter.is_empty() && !filter.is_match_all() {
            return Err(StoreError::invalid(
                "read filter must not be empty; use Filter::all() to match every document",
            ));
        }

        let query = filter.criteria().clone();
        self.record(self.entry(&caller, Operation::ReadRequest).with_query(query.clone()));

        match self.collection.find(filter, limit) {
            Ok(mut documents) => {
                // Third-party collections may not honour the limit
                if limit > 0 {
                    documents.truncate(limit);
                }
                let explain = self.inspector.explain_filter(filter);
                self.record(
                    self.entry(&caller, Operation::ReadResult)
                        .with_query(query)
                        .with_result_count(documents.len() as u64)
                        .with_explain(explain),
                );
                info!(user = %caller, count = documents.len(), "READ by {} returned {} documents", caller, documents.len());
                Ok(documents)
            }
            Err(e) => {
                self.record(
                    self.entry(&caller, Operation::ReadError)
                        .with_query(query)
                        .with_error(e.to_string()),
                );
                error!(user = %caller, error = %e, "READ by {} failed", caller);
                Ok(Vec::new())
            }
        }
    }

    /// Merge `values` into one or every matching document
    ///
    /// Returns the modified count, 0 on failure.
    pub fn update(
        &self,
        user: &str,
        filter: &Filter,
        values: &Document,
        multiple: bool,
    ) -> StoreResult<u64> {
        let caller = Identity::user(user)?;
        require_write_filter(filter)?;
        if values.is_empty() {
            return Err(StoreError::invalid("update values must not be empty"));
        }

        let outcome = if multiple {
            self.collection.update_many(filter, values)
        } else {
            self.collection.update_one(filter, values)
        };

        let entry = |operation: Operation| {
            self.entry(&caller, operation)
                .with_query(filter.criteria().clone())
                .with_data(values.clone())
        };
        match outcome {
            Ok(modified) => {
                self.record(entry(Operation::Update).with_result_count(modified));
                info!(user = %caller, count = modified, "UPDATE by {} modified {} documents", caller, modified);
                Ok(modified)
            }
            Err(e) => {
                self.record(entry(Operation::UpdateError).with_error(e.to_string()));
                error!(user = %caller, error = %e, "UPDATE by {} failed", caller);
                Ok(0)
            }
        }
    }

    /// Remove one or every matching document
    ///
    /// Returns the deleted count, 0 on failure.
    pub fn delete(&self, user: &str, filter: &Filter, multiple: bool) -> StoreResult<u64> {
        let caller = Identity::user(user)?;
        require_write_filter(filter)?;

        let outcome = if multiple {
            self.collection.delete_many(filter)
        } else {
            self.collection.delete_one(filter)
        };

        let entry = |operation: Operation| {
            self.entry(&caller, operation)
                .with_query(filter.criteria().clone())
        };
        match outcome {
            Ok(deleted) => {
                self.record(entry(Operation::Delete).with_result_count(deleted));
                info!(user = %caller, count = deleted, "DELETE by {} removed {} documents", caller, deleted);
                Ok(deleted)
            }
            Err(e) => {
                self.record(entry(Operation::DeleteError).with_error(e.to_string()));
                error!(user = %caller, error = %e, "DELETE by {} failed", caller);
                Ok(0)
            }
        }
    }

    /// Create an ascending index per field, continuing past failures
    ///
    /// One `CREATE_INDEX` entry is written afterwards, attributed to the
    /// administrative identity.
    pub fn create_indexes<I, S>(&self, fields: I) -> BTreeMap<String, IndexOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields: Vec<String> = fields.into_iter().map(|f| f.as_ref().to_string()).collect();

        let mut outcomes = BTreeMap::new();
        for field in &fields {
            let outcome = match self.collection.create_index(field) {
                Ok(name) => {
                    info!(field = %field, index = %name, "Created index on '{}' -> {}", field, name);
                    IndexOutcome::Created(name)
                }
                Err(e) => {
                    error!(field = %field, error = %e, "Failed to create index on '{}'", field);
                    IndexOutcome::Failed(e.to_string())
                }
            };
            outcomes.insert(field.clone(), outcome);
        }

        let data = Document::new().with("fields", Value::from(fields));
        self.record(self.entry(&self.admin, Operation::CreateIndex).with_data(data));
        outcomes
    }

    fn entry(&self, caller: &Identity, operation: Operation) -> AuditEntry {
        AuditEntry::new(caller, operation, self.collection.name())
    }

    fn record(&self, entry: AuditEntry) {
        self.sink.append(&entry);
    }
}

/// Writes never accept an empty filter, sentinel included
fn require_write_filter(filter: &Filter) -> StoreResult<()> {
    if filter.is_empty() {
        return Err(StoreError::invalid(
            "filter must not be empty for update or delete",
        ));
    }
    Ok(())
}
