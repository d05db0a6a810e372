//! Editor session: history plus UI bookkeeping plus persistence.
//!
//! All mutations are synchronous and must be serialized by the owner.
//! [`SharedSession`] wraps the session in a mutex for hosts that deliver
//! callbacks from several tasks. The lock is never held across the network
//! call: [`run_transform`] takes a [`TransformTicket`] under the lock,
//! releases it for the request, then re-locks to finish.
//!
//! # Supersession
//!
//! Every [`EditorSession::begin_transform`] bumps a generation counter.
//! [`EditorSession::finish_transform`] only applies an outcome whose ticket
//! carries the latest generation; older outcomes are reported as
//! [`FinishOutcome::Superseded`] and leave the session untouched.

use std::sync::Arc;

use parking_lot::Mutex;
use tonegrid_types::{Coordinate, ErrorBody, HistoryState, Snapshot, TransformRequest, TransformResponse};

use crate::constants::{STATUS_APPLIED, STATUS_CACHED, STATUS_RESET, STATUS_STORAGE_CLEARED};
use crate::error::{ClientError, StorageError};
use crate::history::HistoryEngine;
use crate::http::ToneService;
use crate::storage::SnapshotStore;

/// UI state that rides along with the history.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    pub selected: Option<Coordinate>,
    pub is_transforming: bool,
    pub last_error: Option<ErrorBody>,
    pub last_status: Option<String>,
}

/// Handle for one in-flight transform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformTicket {
    generation: u64,
    text: String,
    coord: Coordinate,
}

impl TransformTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn coord(&self) -> Coordinate {
        self.coord
    }

    pub fn to_request(&self, prompt_version: impl Into<String>) -> TransformRequest {
        TransformRequest::new(self.text.clone(), self.coord, prompt_version)
    }
}

/// What [`EditorSession::finish_transform`] did with an outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FinishOutcome {
    /// Result recorded in history.
    Applied { cached: bool },
    /// Error recorded in UI state.
    Failed(ErrorBody),
    /// A newer transform started; nothing changed.
    Superseded,
}

pub type SharedSession = Arc<Mutex<EditorSession>>;

pub struct EditorSession {
    history: HistoryEngine,
    ui: UiState,
    generation: u64,
    store: Option<Arc<dyn SnapshotStore>>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("history", &self.history)
            .field("ui", &self.ui)
            .field("generation", &self.generation)
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    /// Session with no persistence.
    pub fn new() -> Self {
        Self {
            history: HistoryEngine::new(),
            ui: UiState::default(),
            generation: 0,
            store: None,
        }
    }

    /// Session that writes a snapshot to `store` after each mutation.
    pub fn with_store(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::new()
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn history(&self) -> &HistoryState {
        self.history.state()
    }

    pub fn engine(&self) -> &HistoryEngine {
        &self.history
    }

    pub fn text(&self) -> &str {
        self.history.present()
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    // ========================================================================
    // Text and history
    // ========================================================================

    pub fn set_text(&mut self, text: impl Into<String>, skip_history: bool) {
        self.history.set_text(text, skip_history);
        self.autosave();
    }

    /// Record a pipeline result and update the status line.
    ///
    /// Status and error are updated even when the text is unchanged.
    pub fn apply_transform(&mut self, text: impl Into<String>, cached: bool) {
        self.history.apply_transform(text);
        self.ui.last_error = None;
        self.ui.last_status = Some(if cached { STATUS_CACHED } else { STATUS_APPLIED }.to_string());
        self.autosave();
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo();
        if moved {
            self.autosave();
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo();
        if moved {
            self.autosave();
        }
        moved
    }

    /// Back to the baseline; clears selection and error.
    pub fn reset(&mut self) {
        self.history.reset();
        self.ui.selected = None;
        self.ui.last_error = None;
        self.ui.last_status = Some(STATUS_RESET.to_string());
        self.autosave();
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub fn select_cell(&mut self, coord: Option<Coordinate>) {
        self.ui.selected = coord;
        self.autosave();
    }

    pub fn set_transforming(&mut self, transforming: bool) {
        self.ui.is_transforming = transforming;
    }

    /// Record (or clear) the last error. A recorded error also sets the status.
    pub fn set_error(&mut self, error: Option<ErrorBody>) {
        if let Some(err) = &error {
            self.ui.last_status = Some(format!("Error: {}", err.message));
        }
        self.ui.last_error = error;
    }

    pub fn set_status(&mut self, status: Option<String>) {
        self.ui.last_status = status;
    }

    // ========================================================================
    // Transform generations
    // ========================================================================

    /// Start a transform of the current text at `coord`.
    ///
    /// Selects the cell, marks the session busy, clears the last error and
    /// hands out a ticket newer than every earlier one.
    pub fn begin_transform(&mut self, coord: Coordinate) -> Result<TransformTicket, ClientError> {
        let text = self.history.present().trim();
        if text.is_empty() {
            return Err(ClientError::EmptyText);
        }
        let text = text.to_string();

        self.generation += 1;
        self.ui.selected = Some(coord);
        self.ui.is_transforming = true;
        self.ui.last_error = None;
        self.autosave();

        Ok(TransformTicket {
            generation: self.generation,
            text,
            coord,
        })
    }

    /// Apply the outcome of `ticket` unless a newer transform has started.
    pub fn finish_transform(
        &mut self,
        ticket: &TransformTicket,
        outcome: Result<TransformResponse, ClientError>,
    ) -> FinishOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                latest = self.generation,
                "discarding superseded transform result"
            );
            return FinishOutcome::Superseded;
        }

        self.ui.is_transforming = false;
        match outcome {
            Ok(response) => {
                self.apply_transform(response.transformed, response.cached);
                FinishOutcome::Applied {
                    cached: response.cached,
                }
            }
            Err(err) => {
                let body = err.to_body();
                tracing::warn!(error = %err, "transform failed");
                self.set_error(Some(body.clone()));
                FinishOutcome::Failed(body)
            }
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// The state as it would be persisted.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.history.state().clone(), self.ui.selected)
    }

    /// Adopt the stored snapshot, if any.
    ///
    /// A stored history with non-empty text replaces the current one and
    /// becomes the reset baseline. A stored selection is restored.
    pub fn hydrate(&mut self) -> bool {
        let Some(store) = self.store.clone() else {
            return false;
        };
        let stored = store.load();

        let mut restored = false;
        if !stored.history.present.is_empty() {
            self.history.restore(stored.history);
            restored = true;
        }
        if stored.ui.selected.is_some() {
            self.ui.selected = stored.ui.selected;
        }
        tracing::debug!(restored, "session hydrated");
        restored
    }

    /// Write the snapshot now. Returns false when skipped (no store, or
    /// nothing worth keeping).
    pub fn persist(&self) -> Result<bool, StorageError> {
        let Some(store) = &self.store else {
            return Ok(false);
        };
        if self.history.present().is_empty() {
            return Ok(false);
        }
        store.save(&self.snapshot())?;
        Ok(true)
    }

    /// Back to the baseline and forget the stored snapshot.
    pub fn clear_storage(&mut self) -> Result<(), StorageError> {
        self.history.reset();
        self.ui.selected = None;
        self.ui.last_error = None;
        self.ui.last_status = Some(STATUS_STORAGE_CLEARED.to_string());
        if let Some(store) = &self.store {
            store.clear()?;
        }
        Ok(())
    }

    fn autosave(&self) {
        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "failed to persist session snapshot");
        }
    }
}

/// Run one transform end to end against `service`.
///
/// The session lock is released while the request is in flight. A result
/// that arrives after a newer transform started is dropped.
pub async fn run_transform(
    session: &SharedSession,
    service: &dyn ToneService,
    coord: Coordinate,
) -> Result<FinishOutcome, ClientError> {
    let ticket = session.lock().begin_transform(coord)?;
    let request = ticket.to_request(service.prompt_version());

    let outcome = service.transform(&request).await;
    Ok(session.lock().finish_transform(&ticket, outcome))
}
