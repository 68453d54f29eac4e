//! Local audit mirror
//!
//! An append-only JSON-lines file holding a copy of every audit entry, for
//! offline reference when the audit collection is unreachable or remote.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{StoreError, StoreResult};

use super::entry::AuditEntry;

/// Appends audit entries to a JSON-lines file
pub struct AuditLogger {
    log_path: PathBuf,
    /// Serializes appends from concurrent repository calls
    write_lock: Mutex<()>,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self {
            log_path,
            write_lock: Mutex::new(()),
        }
    }

    /// Append one entry and flush it
    pub fn log(&self, entry: &AuditEntry) -> StoreResult<()> {
        self.log_batch(std::slice::from_ref(entry))
    }

    /// Append several entries with a single flush
    pub fn log_batch(&self, entries: &[AuditEntry]) -> StoreResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        if let Some(entry) = entries.iter().find(|e| !e.query.is_finite() || !e.data.is_finite()) {
            return Err(StoreError::Json(format!(
                "{} entry holds a non-finite number and cannot be mirrored",
                entry.operation
            )));
        }

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("Failed to create audit log directory: {}", e)))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| StoreError::Io(format!("Failed to open audit log: {}", e)))?;
        let mut writer = BufWriter::new(file);

        for entry in entries {
            serde_json::to_writer(&mut writer, entry)
                .map_err(|e| StoreError::Json(format!("Failed to serialize audit entry: {}", e)))?;
            writer
                .write_all(b"\n")
                .map_err(|e| StoreError::Io(format!("Failed to write audit entry: {}", e)))?;
        }

        writer
            .flush()
            .map_err(|e| StoreError::Io(format!("Failed to flush audit log: {}", e)))
    }

    /// Every entry, oldest first
    pub fn read_all(&self) -> StoreResult<Vec<AuditEntry>> {
        let Some(reader) = self.open_reader()? else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                StoreError::Io(format!("Failed to read audit log line {}: {}", index + 1, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|e| {
                StoreError::Json(format!("Failed to parse audit entry at line {}: {}", index + 1, e))
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// The most recent `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> StoreResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }

    pub fn entry_count(&self) -> StoreResult<usize> {
        match self.open_reader()? {
            Some(reader) => Ok(reader
                .lines()
                .map_while(Result::ok)
                .filter(|l| !l.trim().is_empty())
                .count()),
            None => Ok(0),
        }
    }

    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    fn open_reader(&self) -> StoreResult<Option<BufReader<File>>> {
        match File::open(&self.log_path) {
            Ok(file) => Ok(Some(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(format!("Failed to open audit log: {}", e))),
        }
    }
}
