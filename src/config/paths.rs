//! Path management for audited-store
//!
//! ## Path Resolution Order
//!
//! 1. `AUDITED_STORE_DATA_DIR` environment variable (if set)
//! 2. `$XDG_DATA_HOME/audited-store`
//! 3. `~/.local/share/audited-store`

use std::path::PathBuf;

use crate::error::{StoreError, StoreResult};

const APP_DIR: &str = "audited-store";

/// Manages all paths used by audited-store
#[derive(Debug, Clone)]
pub struct StorePaths {
    base_dir: PathBuf,
}

impl StorePaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no override is set and the home directory cannot
    /// be determined.
    pub fn new() -> StoreResult<Self> {
        let base_dir = match std::env::var_os("AUDITED_STORE_DATA_DIR") {
            Some(custom) => PathBuf::from(custom),
            None => resolve_default_path()?,
        };
        Ok(Self { base_dir })
    }

    /// Use an explicit base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Root for `file://` collections when the descriptor gives no path
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// Default location of the local audit mirror
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn ensure_directories(&self) -> StoreResult<()> {
        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| StoreError::Io(format!("Failed to create data directory: {}", e)))
    }
}

fn resolve_default_path() -> StoreResult<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg).join(APP_DIR));
    }
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .ok_or_else(|| StoreError::Config("Could not determine home directory".into()))?;
    Ok(PathBuf::from(home).join(".local").join("share").join(APP_DIR))
}
