//! Clipstream Web - JSON API server
//!
//! HTTP surface for the resolution and extraction pipeline: stream
//! resolution, manifest rewriting, and clip download endpoints.

pub mod error;
pub mod handlers;
pub mod server;

// Re-export main types
pub use error::ApiError;
pub use server::{AppState, run_server};
