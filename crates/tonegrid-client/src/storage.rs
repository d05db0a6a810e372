//! Snapshot persistence.
//!
//! A [`SnapshotStore`] is a slot holding one serialized [`Snapshot`]. Stores
//! only move raw JSON; decoding and the schema check live in the provided
//! [`SnapshotStore::load`], which never fails: unreadable or foreign-schema
//! data is logged, cleared and replaced by [`Snapshot::default`].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tonegrid_types::Snapshot;

use crate::error::StorageError;

pub trait SnapshotStore: Send + Sync {
    /// Raw stored JSON, `None` when nothing is stored.
    fn read_raw(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored JSON as a whole.
    fn write_raw(&self, json: &str) -> Result<(), StorageError>;

    /// Remove whatever is stored.
    fn clear(&self) -> Result<(), StorageError>;

    /// Load the stored snapshot, falling back to the default.
    fn load(&self) -> Snapshot {
        let raw = match self.read_raw() {
            Ok(Some(raw)) => raw,
            Ok(None) => return Snapshot::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored snapshot");
                return Snapshot::default();
            }
        };

        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) if snapshot.is_current_schema() => snapshot,
            Ok(snapshot) => {
                tracing::warn!(
                    stored = %snapshot.schema_version,
                    "snapshot schema version mismatch, clearing stored data"
                );
                self.discard();
                Snapshot::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored snapshot is unreadable, clearing stored data");
                self.discard();
                Snapshot::default()
            }
        }
    }

    /// Serialize and store a snapshot.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        self.write_raw(&json)
    }

    #[doc(hidden)]
    fn discard(&self) {
        if let Err(e) = self.clear() {
            tracing::warn!(error = %e, "failed to clear stored snapshot");
        }
    }
}

/// Snapshot kept in a JSON file, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn read_raw(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a sibling temp file, then rename over the target.
    fn write_raw(&self, json: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        let written = fs::File::create(&temp_path)
            .and_then(|mut file| {
                file.write_all(json.as_bytes())?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(e) = written {
            // The temp file is ours; never leave it behind.
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        tracing::debug!(path = %self.path.display(), bytes = json.len(), "snapshot written");
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory slot, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-filled with raw JSON.
    pub fn with_raw(json: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(json.into())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().is_none()
    }
}

impl SnapshotStore for MemoryStore {
    fn read_raw(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.lock().clone())
    }

    fn write_raw(&self, json: &str) -> Result<(), StorageError> {
        *self.slot.lock() = Some(json.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot.lock() = None;
        Ok(())
    }
}
