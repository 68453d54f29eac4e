//! JSON snapshot files with atomic replacement
//!
//! A collection snapshot is either fully written or left untouched: data goes
//! to a sibling temp file, is synced, and then renamed over the target.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{StoreError, StoreResult};

/// Load a JSON snapshot, or the default value when the file does not exist yet
pub fn read_json_or_default<T, P>(path: P) -> StoreResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => {
            return Err(StoreError::Io(format!(
                "Failed to open {}: {}",
                path.display(),
                e
            )))
        }
    };

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| StoreError::Json(format!("Corrupt snapshot {}: {}", path.display(), e)))
}

/// Replace a JSON snapshot atomically
pub fn write_json_atomic<T, P>(path: P, data: &T) -> StoreResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            StoreError::Io(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    let staging = staging_path(path);
    let result = write_staged(&staging, data).and_then(|()| {
        fs::rename(&staging, path).map_err(|e| {
            StoreError::Io(format!("Failed to replace {}: {}", path.display(), e))
        })
    });

    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_staged<T: Serialize>(staging: &Path, data: &T) -> StoreResult<()> {
    let file = File::create(staging).map_err(|e| {
        StoreError::Io(format!("Failed to create {}: {}", staging.display(), e))
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, data)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        names: Vec<String>,
    }

    #[test]
    fn test_missing_file_yields_default() {
        let temp_dir = TempDir::new().unwrap();
        let loaded: Snapshot = read_json_or_default(temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Snapshot::default());
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db").join("animals.json");
        let snapshot = Snapshot {
            names: vec!["Fido".into(), "Rex".into()],
        };

        write_json_atomic(&path, &snapshot).unwrap();

        let loaded: Snapshot = read_json_or_default(&path).unwrap();
        assert_eq!(loaded, snapshot);
        assert!(!temp_dir.path().join("db").join("animals.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("animals.json");
        fs::write(&path, "not json").unwrap();

        let err = read_json_or_default::<Snapshot, _>(&path).unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }
}
