//! Audit trail inspection and export

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::audit::{AuditEntry, AuditLogger};
use crate::error::{StoreError, StoreResult};
use crate::export::{self, export_audit_csv, export_audit_json};
use crate::store::Collection;

/// Show recent audit entries
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Number of entries to show
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,

    /// Read the local mirror file instead of the audit collection
    #[arg(long)]
    pub local: bool,
}

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// One row per entry
    Csv,
    /// Versioned document with every entry
    Json,
}

/// Export the audit trail to a file
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file path
    pub output: PathBuf,

    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ExportFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Print the most recent entries from the audit collection
pub fn handle_audit_command(audit_collection: &dyn Collection, args: &AuditArgs) -> StoreResult<()> {
    let trail = export::load_audit_trail(audit_collection)?;
    let start = trail.len().saturating_sub(args.limit);
    print_entries(&trail[start..], trail.len());
    Ok(())
}

/// Print the most recent entries from the local mirror file
pub fn handle_local_audit_command(mirror: &AuditLogger, args: &AuditArgs) -> StoreResult<()> {
    if !mirror.exists() {
        println!("No local audit log at {}", mirror.path().display());
        println!("Set WRITE_LOCAL_AUDIT=1 to enable it.");
        return Ok(());
    }
    let total = mirror.entry_count()?;
    let entries = mirror.read_recent(args.limit)?;
    print_entries(&entries, total);
    Ok(())
}

fn print_entries(entries: &[AuditEntry], total: usize) {
    if entries.is_empty() {
        println!("No audit entries recorded.");
        return;
    }
    for entry in entries {
        println!("{}", entry.format_human_readable());
    }
    println!();
    println!("Showing {} of {} entries", entries.len(), total);
}

/// Write the audit trail to `args.output`
pub fn handle_export_command(
    audit_collection: &dyn Collection,
    collection_name: &str,
    args: &ExportArgs,
) -> StoreResult<()> {
    let entries = export::load_audit_trail(audit_collection)?;
    let count = entries.len();

    let file = File::create(&args.output).map_err(|e| {
        StoreError::Export(format!(
            "Failed to create file {}: {}",
            args.output.display(),
            e
        ))
    })?;
    let writer = BufWriter::new(file);

    match args.format {
        ExportFormat::Csv => export_audit_csv(&entries, writer)?,
        ExportFormat::Json => export_audit_json(collection_name, entries, writer, args.pretty)?,
    }

    println!("Exported {} audit entries to: {}", count, args.output.display());
    Ok(())
}
