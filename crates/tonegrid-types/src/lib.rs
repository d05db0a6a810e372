//! Shared types for tonegrid.
//!
//! This crate is the common vocabulary of the server and the session side:
//! grid coordinates, tone labels, history state, the persisted snapshot and
//! the request/response shapes of the transform endpoint. It has **no
//! internal tonegrid dependencies**; it is the leaf crate the others
//! build on.
//!
//! # Key Types
//!
//! |-------------------|-----------------------------------------------|
//! | Type              | Purpose                                       |
//! |-------------------|-----------------------------------------------|
//! | [`Coordinate`]    | Validated cell in the 3×3 tone grid           |
//! | [`ToneDescriptor`]| (formality, voice) pair a coordinate names    |
//! | [`HistoryState`]  | past / present / future text states           |
//! | [`Snapshot`]      | Persisted session state (schema versioned)    |
//! | [`TransformRequest`] / [`TransformResponse`] | Endpoint wire types |
//! | [`ErrorCode`] / [`ErrorBody`] | Typed error on the wire           |
//! |-------------------|-----------------------------------------------|

pub mod coord;
pub mod history;
pub mod snapshot;
pub mod tone;
pub mod wire;

// Re-export primary types at crate root for convenience.
pub use coord::{Axis, CoordError, Coordinate, RawCoords, COORD_MAX, COORD_MIN};
pub use history::HistoryState;
pub use snapshot::{Snapshot, UiSnapshot, SNAPSHOT_SCHEMA_VERSION};
pub use tone::{Formality, ToneDescriptor, Voice};
pub use wire::{
    ErrorBody, ErrorCode, ErrorEnvelope, HealthResponse, MSG_AUTH, MSG_EMPTY_RESPONSE,
    MSG_INTERNAL, MSG_RATE_LIMITED, MSG_UPSTREAM_RATE_LIMITED, MSG_UPSTREAM_UNAVAILABLE,
    MSG_VALIDATION, MSG_VERSION_MISMATCH, TransformRequest, TransformResponse,
};

/// Current time as Unix milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
