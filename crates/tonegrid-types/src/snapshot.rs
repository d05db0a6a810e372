//! Persisted session snapshot.
//!
//! The JSON shape is `{schemaVersion, history: {past, present, future},
//! ui: {selected}, timestamp}`. A stored snapshot whose `schemaVersion`
//! differs from [`SNAPSHOT_SCHEMA_VERSION`] is never interpreted; loaders
//! fall back to [`Snapshot::default`].

use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;
use crate::history::HistoryState;

/// Bump when the snapshot structure changes.
pub const SNAPSHOT_SCHEMA_VERSION: &str = "1.0.0";

/// UI bookkeeping that survives a reload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiSnapshot {
    /// Last selected grid cell.
    pub selected: Option<Coordinate>,
}

/// A whole-session snapshot, written atomically by the storage layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub schema_version: String,
    pub history: HistoryState,
    pub ui: UiSnapshot,
    /// When this snapshot was taken (Unix millis).
    pub timestamp: u64,
}

impl Snapshot {
    /// Build a current-schema snapshot stamped with the current time.
    pub fn new(history: HistoryState, selected: Option<Coordinate>) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION.to_string(),
            history,
            ui: UiSnapshot { selected },
            timestamp: crate::now_millis(),
        }
    }

    /// Whether this snapshot was written with the current schema.
    pub fn is_current_schema(&self) -> bool {
        self.schema_version == SNAPSHOT_SCHEMA_VERSION
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(HistoryState::default(), None)
    }
}

// ============================================================================
// Tests
// ============================================================================
