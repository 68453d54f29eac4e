//! JSON export of the audit trail with schema versioning

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::error::{StoreError, StoreResult};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Exported audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Version of the tool that wrote the export
    pub app_version: String,

    /// Collection the audited operations acted on
    pub collection: String,

    pub entry_count: usize,

    pub entries: Vec<AuditEntry>,
}

impl AuditExport {
    pub fn new(collection: impl Into<String>, entries: Vec<AuditEntry>) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            collection: collection.into(),
            entry_count: entries.len(),
            entries,
        }
    }

    /// Check version and internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }
        if self.entry_count != self.entries.len() {
            return Err(format!(
                "Entry count mismatch: header says {}, found {}",
                self.entry_count,
                self.entries.len()
            ));
        }
        if let Some(pair) = self
            .entries
            .windows(2)
            .find(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(format!(
                "Entries out of order at {}",
                pair[1].timestamp.to_rfc3339()
            ));
        }
        Ok(())
    }
}

/// Write the audit trail as one JSON document
pub fn export_audit_json<W: Write>(
    collection: &str,
    entries: Vec<AuditEntry>,
    writer: W,
    pretty: bool,
) -> StoreResult<()> {
    let export = AuditExport::new(collection, entries);

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| StoreError::Export(e.to_string()))
}

/// Parse and validate a previous export
pub fn import_audit_json(json_str: &str) -> StoreResult<AuditExport> {
    let export: AuditExport =
        serde_json::from_str(json_str).map_err(|e| StoreError::Export(e.to_string()))?;
    export.validate().map_err(StoreError::Export)?;
    Ok(export)
}
