//! Client configuration constants.
//!
//! Centralizes hardcoded values for easier configuration and documentation.

use std::time::Duration;

/// Default tonegrid server for local development.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Transform endpoint path.
pub const TONE_PATH: &str = "/api/tone";

/// Health endpoint path.
pub const HEALTH_PATH: &str = "/api/health";

/// Prompt version this client was built against. Refreshed from the server's
/// health endpoint when the server reports a mismatch.
pub const DEFAULT_PROMPT_VERSION: &str = "1.0.0";

/// Timeout for one transform round trip. Longer than the server's own
/// backend timeout so server-side errors arrive as typed errors.
pub const CLIENT_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Directory name under the platform data dir.
pub const STATE_DIR_NAME: &str = "tonegrid";

/// Snapshot file name.
pub const STATE_FILE_NAME: &str = "session.json";

// Status lines shown after session operations.
pub const STATUS_CACHED: &str = "Used cached result";
pub const STATUS_APPLIED: &str = "Transformation applied";
pub const STATUS_RESET: &str = "Reset to original text";
pub const STATUS_STORAGE_CLEARED: &str = "Storage cleared";
