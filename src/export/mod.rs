//! Audit trail export
//!
//! Hands the audit trail to downstream forensic tooling:
//! - CSV: one row per entry, structured columns JSON-encoded
//! - JSON: versioned document holding every entry

pub mod csv;
pub mod json;

pub use csv::export_audit_csv;
pub use json::{export_audit_json, import_audit_json, AuditExport, EXPORT_SCHEMA_VERSION};

use crate::audit::AuditEntry;
use crate::error::StoreResult;
use crate::models::Filter;
use crate::store::Collection;

/// Every entry in an audit collection, in the order it was written
pub fn load_audit_trail(collection: &dyn Collection) -> StoreResult<Vec<AuditEntry>> {
    collection
        .find(&Filter::all(), 0)?
        .iter()
        .map(AuditEntry::from_document)
        .collect()
}
