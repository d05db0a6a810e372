//! tonegrid session library
//!
//! The editing side of tonegrid: a linear undo/redo history over text, the
//! session state wrapped around it (selection, status, in-flight transform
//! generations), snapshot persistence, and the HTTP client for a tonegrid
//! server.

pub mod constants;
pub mod error;
pub mod history;
pub mod http;
pub mod session;
pub mod storage;

pub use error::{ClientError, StorageError};
pub use history::HistoryEngine;
pub use http::{ToneClient, ToneService};
pub use session::{
    EditorSession, FinishOutcome, SharedSession, TransformTicket, UiState, run_transform,
};
pub use storage::{JsonFileStore, MemoryStore, SnapshotStore};

/// Default snapshot location under the platform data directory.
pub fn default_state_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(constants::STATE_DIR_NAME)
        .join(constants::STATE_FILE_NAME)
}
