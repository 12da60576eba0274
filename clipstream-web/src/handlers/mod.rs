//! HTTP request handlers organized by functionality

pub mod api;

// Re-export handler functions
pub use api::{
    ClipBody, ManifestQuery, ResolveQuery, ResolveResponse, api_clip, api_health, api_manifest,
    api_resolve,
};
