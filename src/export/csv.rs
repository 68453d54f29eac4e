//! CSV export of audit entries

use std::io::Write;

use crate::audit::AuditEntry;
use crate::error::{StoreError, StoreResult};

const HEADER: [&str; 9] = [
    "timestamp",
    "user",
    "operation",
    "collection",
    "query",
    "data",
    "result_count",
    "error",
    "explain",
];

/// Write entries as CSV with a header row
///
/// `query`, `data` and `explain` are JSON-encoded; absent optional fields are
/// empty cells.
pub fn export_audit_csv<W: Write>(entries: &[AuditEntry], writer: W) -> StoreResult<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for entry in entries {
        let explain = match &entry.explain {
            Some(explain) => serde_json::to_string(explain)
                .map_err(|e| StoreError::Export(e.to_string()))?,
            None => String::new(),
        };
        let timestamp = entry.timestamp.to_rfc3339();
        let query = entry.query.to_string();
        let data = entry.data.to_string();
        let result_count = entry
            .result_count
            .map(|c| c.to_string())
            .unwrap_or_default();

        csv_writer.write_record([
            timestamp.as_str(),
            entry.user.as_str(),
            entry.operation.as_str(),
            entry.collection.as_str(),
            query.as_str(),
            data.as_str(),
            result_count.as_str(),
            entry.error.as_deref().unwrap_or(""),
            explain.as_str(),
        ])?;
    }

    csv_writer
        .flush()
        .map_err(|e| StoreError::Export(e.to_string()))
}
