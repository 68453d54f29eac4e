//! Audit trail for audited-store
//!
//! Every repository operation produces one or more append-only audit entries.
//!
//! # Architecture
//!
//! - `AuditEntry`: a single forensic record (who, when, what, outcome).
//! - `AuditSink`: write-only destination; `CollectionAuditSink` persists to
//!   the audit collection and never propagates its own failures.
//! - `FallbackLog`: secondary channel receiving entries the sink could not
//!   persist.
//! - `AuditLogger`: optional local JSON-lines mirror.
//!
//! # Example
//!
//! ```rust,ignore
//! use audited_store::audit::{AuditEntry, AuditSink, CollectionAuditSink, Operation};
//!
//! let sink = CollectionAuditSink::new(provider.audit_collection());
//! let entry = AuditEntry::new(&alice, Operation::Create, "animals")
//!     .with_data(document)
//!     .with_result_count(1);
//! sink.append(&entry);
//! ```

mod entry;
mod logger;
mod sink;

pub use entry::{AuditEntry, ExplainInfo, Operation};
pub use logger::AuditLogger;
pub use sink::{AuditSink, CollectionAuditSink, FallbackLog, TracingFallback};
