//! Server configuration constants.
//!
//! Centralizes hardcoded values for easier configuration and documentation.

use std::time::Duration;

/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// How often idle rate-limit entries and expired cache entries are swept.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Client identifier used when no proxy header names one.
pub const UNKNOWN_CLIENT: &str = "unknown";
