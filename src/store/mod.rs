//! Document store layer
//!
//! [`Collection`] is the handle contract the audited repository works
//! against. Two implementations ship with the crate: [`MemoryCollection`] for
//! tests and ephemeral use, and [`FileCollection`], which persists each
//! collection as an atomically replaced JSON snapshot. Connection handling
//! lives in [`provider`].

mod engine;
pub mod file;
pub mod file_io;
pub mod memory;
pub mod plan;
pub mod provider;

pub use file::FileCollection;
pub use memory::MemoryCollection;
pub use plan::{QueryPlan, ScanStage, WinningPlan};
pub use provider::{ConnectionProvider, LocalProvider};

use crate::error::StoreResult;
use crate::models::{Document, DocumentId, Filter};

/// A handle to one collection in a document store
///
/// Implementations must be safe to share between threads; the repository and
/// the query plan inspector hold the same handle behind an `Arc`.
pub trait Collection: Send + Sync {
    /// Collection name, without the database prefix
    fn name(&self) -> &str;

    /// Insert a document and return its store-assigned identifier
    fn insert_one(&self, document: Document) -> StoreResult<DocumentId>;

    /// Matching documents in store order; `limit == 0` means no limit
    fn find(&self, filter: &Filter, limit: usize) -> StoreResult<Vec<Document>>;

    /// Merge fields into the first matching document, returning the modified count
    fn update_one(&self, filter: &Filter, set: &Document) -> StoreResult<u64>;

    /// Merge fields into every matching document, returning the modified count
    fn update_many(&self, filter: &Filter, set: &Document) -> StoreResult<u64>;

    /// Remove the first matching document, returning the deleted count
    fn delete_one(&self, filter: &Filter) -> StoreResult<u64>;

    /// Remove every matching document, returning the deleted count
    fn delete_many(&self, filter: &Filter) -> StoreResult<u64>;

    /// Create an ascending single-field index, returning its name
    fn create_index(&self, field: &str) -> StoreResult<String>;

    /// Describe how the store would execute `filter` without running it
    fn explain(&self, filter: &Filter) -> StoreResult<QueryPlan>;
}
