//! # tonegrid-server
//!
//! HTTP deployment of the tonegrid transform pipeline: an axum router over a
//! shared [`TransformPipeline`](tonegrid_kernel::TransformPipeline), TOML
//! configuration, and client identity from proxy headers.

pub mod client_id;
pub mod config;
pub mod constants;
pub mod http;

pub use client_id::client_id;
pub use config::{ConfigError, ServerConfig};
pub use http::{ApiError, SharedPipeline, router};
