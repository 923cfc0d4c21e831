//! JSON snapshot of the planner state.
//!
//! The engine itself does not persist anything; this file exists so the CLI
//! can be driven across invocations. Writes go through a temp file and a
//! rename so a crash never leaves a half-written snapshot.

use std::path::{Path, PathBuf};

use crate::engine::Planner;
use crate::error::StorageError;

use super::data_dir;

pub const SNAPSHOT_FILE: &str = "planner.json";

/// Location of a planner snapshot on disk.
#[derive(Debug, Clone)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot in the default data directory.
    pub fn default_location() -> crate::error::Result<Self> {
        Ok(Self::at(data_dir()?.join(SNAPSHOT_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the planner, or an empty one if no snapshot exists yet.
    pub fn load(&self) -> Result<Planner, StorageError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Planner::default()),
            Err(source) => {
                return Err(StorageError::ReadFailed {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, planner: &Planner) -> Result<(), StorageError> {
        let write_failed = |source| StorageError::WriteFailed {
            path: self.path.clone(),
            source,
        };
        let text = serde_json::to_string_pretty(planner)
            .map_err(|e| write_failed(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, text).map_err(write_failed)?;
        std::fs::rename(&tmp_path, &self.path).map_err(write_failed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::Category;

    #[test]
    fn missing_snapshot_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::at(dir.path().join("planner.json"));
        assert_eq!(snapshot.load().unwrap(), Planner::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::at(dir.path().join("nested").join("planner.json"));
        let mut planner = Planner::default();
        planner.add_root_goal("Garden", Category::Play, "outdoors");
        snapshot.save(&planner).unwrap();
        assert_eq!(snapshot.load().unwrap(), planner);
        assert!(!dir.path().join("nested").join("planner.json.tmp").exists());
    }

    #[test]
    fn corrupt_snapshot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Snapshot::at(&path).load(),
            Err(StorageError::Corrupt { .. })
        ));
    }
}
