//! Settings for audited-store
//!
//! Persisted as JSON next to the data directory. Every field has a serde
//! default so partial files load cleanly; a handful of environment variables
//! override the file.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::StorePaths;
use crate::error::{StoreError, StoreResult};
use crate::models::Identity;

/// Runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Logical database holding both collections
    #[serde(default = "default_database")]
    pub database: String,

    /// Primary collection the repository acts on
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Collection receiving audit entries
    #[serde(default = "default_audit_collection")]
    pub audit_collection: String,

    /// Identity recorded for administrative actions such as index creation
    #[serde(default = "default_admin_identity")]
    pub admin_identity: String,

    /// Mirror every audit entry to a local JSON-lines file
    #[serde(default)]
    pub write_local_audit: bool,

    /// Directory for the local audit mirror (defaults to the base directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_audit_dir: Option<PathBuf>,

    /// Upper bound on a query plan inspection
    #[serde(default = "default_explain_timeout_ms")]
    pub explain_timeout_ms: u64,
}

fn default_database() -> String {
    "aac".to_string()
}

fn default_collection() -> String {
    "animals".to_string()
}

fn default_audit_collection() -> String {
    "audit_logs".to_string()
}

fn default_admin_identity() -> String {
    "admin".to_string()
}

fn default_explain_timeout_ms() -> u64 {
    5000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: default_database(),
            collection: default_collection(),
            audit_collection: default_audit_collection(),
            admin_identity: default_admin_identity(),
            write_local_audit: false,
            local_audit_dir: None,
            explain_timeout_ms: default_explain_timeout_ms(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_or_create(paths: &StorePaths) -> StoreResult<Self> {
        let settings_path = paths.settings_file();
        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| StoreError::Io(format!("Failed to read settings file: {}", e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| StoreError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &StorePaths) -> StoreResult<()> {
        std::fs::create_dir_all(paths.base_dir())
            .map_err(|e| StoreError::Io(format!("Failed to create base directory: {}", e)))?;
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| StoreError::Config(format!("Failed to serialize settings: {}", e)))?;
        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| StoreError::Io(format!("Failed to write settings file: {}", e)))
    }

    /// Apply `STORE_DB`, `WRITE_LOCAL_AUDIT` and `AUDIT_LOG_DIR`
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(database) = lookup("STORE_DB").filter(|v| !v.trim().is_empty()) {
            self.database = database;
        }
        if let Some(flag) = lookup("WRITE_LOCAL_AUDIT") {
            self.write_local_audit = matches!(flag.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(dir) = lookup("AUDIT_LOG_DIR").filter(|v| !v.trim().is_empty()) {
            self.local_audit_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Where the local audit mirror lives
    pub fn local_audit_file(&self, paths: &StorePaths) -> PathBuf {
        match &self.local_audit_dir {
            Some(dir) => dir.join("audit.log"),
            None => paths.audit_log(),
        }
    }

    pub fn admin(&self) -> StoreResult<Identity> {
        Identity::system(&self.admin_identity)
            .map_err(|_| StoreError::Config("admin_identity must not be empty".into()))
    }

    pub fn explain_timeout(&self) -> Duration {
        Duration::from_millis(self.explain_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.database, "aac");
        assert_eq!(settings.collection, "animals");
        assert_eq!(settings.audit_collection, "audit_logs");
        assert_eq!(settings.admin().unwrap().name(), "admin");
        assert!(!settings.write_local_audit);
        assert_eq!(settings.explain_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = StorePaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.collection = "shelter".into();
        settings.admin_identity = "ops-bot".into();
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.collection, "shelter");
        assert_eq!(loaded.admin().unwrap().name(), "ops-bot");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = StorePaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"database": "shelter"}"#).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.database, "shelter");
        assert_eq!(loaded.collection, "animals");
    }

    #[test]
    fn test_env_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let paths = StorePaths::with_base_dir(temp_dir.path().to_path_buf());
        let settings = Settings::default().with_overrides(|key| match key {
            "STORE_DB" => Some("other".into()),
            "WRITE_LOCAL_AUDIT" => Some("Yes".into()),
            "AUDIT_LOG_DIR" => Some("/tmp/audit".into()),
            _ => None,
        });

        assert_eq!(settings.database, "other");
        assert!(settings.write_local_audit);
        assert_eq!(settings.local_audit_file(&paths), PathBuf::from("/tmp/audit/audit.log"));
    }

    #[test]
    fn test_blank_admin_identity_rejected() {
        let mut settings = Settings::default();
        settings.admin_identity = "  ".into();
        assert!(matches!(settings.admin(), Err(StoreError::Config(_))));
    }
}
