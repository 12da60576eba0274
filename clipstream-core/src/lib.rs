//! Clipstream Core - VOD stream resolution and clip extraction
//!
//! This crate provides the building blocks for turning a recorded VOD into a
//! downloadable clip: playback token acquisition, signed manifest resolution,
//! playlist rewriting, time normalization, and stream-copy clip extraction.

pub mod auth;
pub mod config;
pub mod extract;
pub mod manifest;
pub mod metadata;
pub mod pipeline;
pub mod timecode;
pub mod tracing_setup;
pub mod vod;

// Re-export main types for convenient access
pub use auth::{AppToken, AuthError, PlaybackToken, TokenClient};
pub use config::ClipstreamConfig;
pub use extract::{ClipExtractor, ClipRequest, ClipResult, ExtractError};
pub use manifest::{ManifestError, ResolvedManifest};
pub use pipeline::{ClipPhase, ClipPipeline, ResolvedStream};
pub use timecode::{TimeRange, TimeSpec, TimecodeError};
pub use vod::VodReference;

/// Core errors that can bubble up from any Clipstream subsystem.
#[derive(Debug, thiserror::Error)]
pub enum ClipError {
    #[error("time value error: {0}")]
    Timecode(#[from] TimecodeError),

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("invalid VOD reference: {input}")]
    InvalidVodReference { input: String },
}

/// Stable classification of a pipeline failure.
///
/// Carried in `ClipPhase::Failed` and used by transport layers to pick a
/// status class without matching on nested error enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthConfig,
    UpstreamAuth,
    ManifestFetch,
    UpstreamTimeout,
    ManifestParse,
    NoVariantFound,
    TimeParse,
    InvalidRange,
    InvalidSource,
    ExtractionFailed,
    ExtractionIntegrity,
}

/// Coarse grouping of error kinds for status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller supplied bad input; reject with a client error.
    Client,
    /// The upstream platform is unavailable or rejecting us.
    Upstream,
    /// The upstream responded, but with a shape we cannot use.
    UpstreamFormat,
    /// The extraction engine failed or produced an invalid file.
    Internal,
}

impl ErrorKind {
    pub fn class(self) -> ErrorClass {
        match self {
            ErrorKind::TimeParse
            | ErrorKind::InvalidRange
            | ErrorKind::InvalidSource => ErrorClass::Client,
            ErrorKind::AuthConfig
            | ErrorKind::UpstreamAuth
            | ErrorKind::ManifestFetch
            | ErrorKind::UpstreamTimeout => ErrorClass::Upstream,
            ErrorKind::ManifestParse | ErrorKind::NoVariantFound => ErrorClass::UpstreamFormat,
            ErrorKind::ExtractionFailed | ErrorKind::ExtractionIntegrity => ErrorClass::Internal,
        }
    }

    /// Short machine-readable tag echoed in API error bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::AuthConfig => "auth_config",
            ErrorKind::UpstreamAuth => "upstream_auth",
            ErrorKind::ManifestFetch => "manifest_fetch",
            ErrorKind::UpstreamTimeout => "upstream_timeout",
            ErrorKind::ManifestParse => "manifest_parse",
            ErrorKind::NoVariantFound => "no_variant_found",
            ErrorKind::TimeParse => "time_parse",
            ErrorKind::InvalidRange => "invalid_range",
            ErrorKind::InvalidSource => "invalid_source",
            ErrorKind::ExtractionFailed => "extraction_failed",
            ErrorKind::ExtractionIntegrity => "extraction_integrity",
        }
    }
}

impl ClipError {
    /// Classifies this error for state tracking and status mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClipError::Timecode(TimecodeError::Unparseable { .. }) => ErrorKind::TimeParse,
            ClipError::Timecode(TimecodeError::InvalidRange { .. }) => ErrorKind::InvalidRange,
            ClipError::Auth(AuthError::MissingCredentials { .. }) => ErrorKind::AuthConfig,
            ClipError::Auth(AuthError::Timeout { .. }) => ErrorKind::UpstreamTimeout,
            ClipError::Auth(_) => ErrorKind::UpstreamAuth,
            ClipError::Manifest(ManifestError::Fetch { .. })
            | ClipError::Manifest(ManifestError::Transport { .. }) => ErrorKind::ManifestFetch,
            ClipError::Manifest(ManifestError::Timeout { .. }) => ErrorKind::UpstreamTimeout,
            ClipError::Manifest(ManifestError::NoVariant) => ErrorKind::NoVariantFound,
            ClipError::Manifest(ManifestError::Parse { .. }) => ErrorKind::ManifestParse,
            ClipError::Extract(ExtractError::InvalidSource { .. }) => ErrorKind::InvalidSource,
            ClipError::Extract(ExtractError::Timeout { .. }) => ErrorKind::UpstreamTimeout,
            ClipError::Extract(ExtractError::IntegrityCheckFailed { .. }) => {
                ErrorKind::ExtractionIntegrity
            }
            ClipError::Extract(_) => ErrorKind::ExtractionFailed,
            ClipError::InvalidVodReference { .. } => ErrorKind::InvalidSource,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClipError>;
