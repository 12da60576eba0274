//! Master manifest resolution and playlist rewriting.
//!
//! The resolver fetches a signed master playlist from the platform's edge
//! broker and picks the best-quality variant. The rewriter is an independent
//! utility that makes any playlist's relative segment references absolute so
//! it stays valid when re-served from a different origin.

pub mod resolver;
pub mod rewrite;

pub use resolver::{ManifestResolver, parse_variants, select_variant_uri};
pub use rewrite::rewrite;

/// Errors from manifest fetching and parsing.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest fetch failed with status {status}")]
    Fetch { status: u16 },

    #[error("manifest fetch timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("manifest transport error: {reason}")]
    Transport { reason: String },

    #[error("malformed manifest: {reason}")]
    Parse { reason: String },

    #[error("no playable variant found in manifest")]
    NoVariant,
}

/// One quality-level entry in a master playlist: a tag line with attributes
/// followed by the variant's URI line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestVariant {
    pub label: String,
    pub uri: String,
    pub is_source_quality: bool,
}

/// A resolved master manifest: the chosen variant plus the raw playlist text
/// for callers that re-serve or inspect it.
#[derive(Debug, Clone)]
pub struct ResolvedManifest {
    pub variant_uri: String,
    pub raw: String,
    pub variants: Vec<ManifestVariant>,
}
