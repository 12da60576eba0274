//! Time-accurate clip extraction.
//!
//! One `ClipExtractor` contract with two interchangeable strategies: a local
//! ffmpeg subprocess and a remote extraction-service delegate. Validation,
//! the output integrity gate, and temp-file cleanup are identical regardless
//! of strategy. No retries happen here; retry policy belongs to the caller.

pub mod local;
pub mod mp4;
pub mod remote;

use std::sync::Arc;

use bytes::Bytes;
pub use local::LocalProcessExtractor;
pub use mp4::{MP4_MIME, has_container_signature, validate_clip_bytes};
pub use remote::RemoteDelegateExtractor;
use url::Url;

use crate::config::{ExtractionConfig, ExtractionStrategy};
use crate::timecode::TimeRange;

/// Errors from clip extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("source locator must be an absolute http(s) URL: {input}")]
    InvalidSource { input: String },

    #[error("extraction engine failed: {detail}")]
    EngineFailed { detail: String },

    #[error("extracted output failed integrity check: {reason}")]
    IntegrityCheckFailed { reason: String },

    #[error("extraction timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("extractor misconfigured: {reason}")]
    Misconfigured { reason: String },

    #[error("I/O error during extraction")]
    Io(#[from] std::io::Error),
}

/// A validated clip extraction request.
///
/// Construction rejects non-`http(s)` source locators before any network or
/// subprocess work, so a bare filesystem path can never reach an engine.
#[derive(Debug, Clone)]
pub struct ClipRequest {
    source: Url,
    pub range: TimeRange,
}

impl ClipRequest {
    /// # Errors
    ///
    /// - `ExtractError::InvalidSource` - locator is not an absolute http(s) URL
    pub fn new(source_locator: &str, range: TimeRange) -> Result<Self, ExtractError> {
        let source = Url::parse(source_locator).map_err(|_| ExtractError::InvalidSource {
            input: source_locator.to_string(),
        })?;

        if source.scheme() != "http" && source.scheme() != "https" {
            return Err(ExtractError::InvalidSource {
                input: source_locator.to_string(),
            });
        }

        Ok(Self { source, range })
    }

    pub fn source(&self) -> &str {
        self.source.as_str()
    }
}

/// A trimmed, container-valid clip held in memory.
#[derive(Debug, Clone)]
pub struct ClipResult {
    pub bytes: Bytes,
    pub mime_type: String,
}

/// Abstraction over the clip-trimming engine.
///
/// Implementations accept a source locator and a time range and return the
/// trimmed bytes plus their mime type, with the same integrity guarantees.
#[async_trait::async_trait]
pub trait ClipExtractor: Send + Sync {
    /// Produces a stream-copied clip for the request's time range.
    ///
    /// # Errors
    ///
    /// - `ExtractError::EngineFailed` - engine exited non-zero or delegate returned non-2xx
    /// - `ExtractError::IntegrityCheckFailed` - output empty or missing a container signature
    /// - `ExtractError::Timeout` - extraction exceeded the wall-clock limit
    async fn extract(&self, request: &ClipRequest) -> Result<ClipResult, ExtractError>;
}

/// Builds the extractor selected by configuration.
///
/// # Errors
///
/// - `ExtractError::Misconfigured` - remote strategy without a delegate URL
pub fn extractor_from_config(
    config: &ExtractionConfig,
) -> Result<Arc<dyn ClipExtractor>, ExtractError> {
    match config.strategy {
        ExtractionStrategy::LocalProcess => Ok(Arc::new(LocalProcessExtractor::new(config.clone()))),
        ExtractionStrategy::RemoteDelegate => {
            let delegate_url =
                config
                    .delegate_url
                    .clone()
                    .ok_or_else(|| ExtractError::Misconfigured {
                        reason: "remote strategy selected but no delegate URL configured"
                            .to_string(),
                    })?;
            Ok(Arc::new(RemoteDelegateExtractor::new(
                delegate_url,
                config.extraction_timeout,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> TimeRange {
        TimeRange {
            start_seconds: 10,
            end_seconds: 15,
        }
    }

    #[test]
    fn test_clip_request_accepts_absolute_http_urls() {
        let request = ClipRequest::new("https://cdn.example.net/vod/index.m3u8", range()).unwrap();
        assert_eq!(request.source(), "https://cdn.example.net/vod/index.m3u8");
        assert_eq!(request.range.duration_seconds(), 5);
    }

    #[test]
    fn test_clip_request_rejects_bare_paths_and_other_schemes() {
        for input in [
            "/etc/passwd",
            "relative/video.mp4",
            "file:///tmp/video.mp4",
            "ftp://host/video.mp4",
        ] {
            assert!(
                matches!(
                    ClipRequest::new(input, range()),
                    Err(ExtractError::InvalidSource { .. })
                ),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_factory_requires_delegate_url_for_remote() {
        let config = ExtractionConfig {
            strategy: ExtractionStrategy::RemoteDelegate,
            delegate_url: None,
            ..Default::default()
        };
        assert!(matches!(
            extractor_from_config(&config),
            Err(ExtractError::Misconfigured { .. })
        ));
    }

    #[test]
    fn test_factory_builds_local_extractor() {
        let config = ExtractionConfig::default();
        assert!(extractor_from_config(&config).is_ok());
    }
}
