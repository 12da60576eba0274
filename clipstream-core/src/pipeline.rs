//! Per-request orchestration of the resolution and extraction stages.
//!
//! Each clip request runs one sequential pipeline: token acquisition, signed
//! manifest resolution, then extraction. Stages share nothing across
//! requests; all tokens and intermediate state live on the stack of a single
//! call.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::auth::TokenClient;
use crate::config::ClipstreamConfig;
use crate::extract::{ClipExtractor, ClipRequest, ClipResult, extractor_from_config};
use crate::manifest::ManifestResolver;
use crate::metadata::MetadataClient;
use crate::timecode::{self, TimeSpec};
use crate::vod::VodReference;
use crate::{ClipError, ErrorKind, Result};

/// Lifecycle of one clip request.
///
/// `Succeeded` and `Failed` are terminal; a failed request is restarted from
/// `Pending` by the caller, never resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipPhase {
    Pending,
    ResolvingToken,
    ResolvingManifest,
    Extracting,
    Succeeded,
    Failed(ErrorKind),
}

impl ClipPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, ClipPhase::Succeeded | ClipPhase::Failed(_))
    }
}

/// Result of `resolve_stream`: a directly-addressable variant URI plus
/// best-effort display metadata.
#[derive(Debug, Clone)]
pub struct ResolvedStream {
    pub stream_url: String,
    pub title: String,
    pub duration_label: String,
}

/// The VOD resolution and clip extraction pipeline.
pub struct ClipPipeline {
    tokens: TokenClient,
    resolver: ManifestResolver,
    metadata: MetadataClient,
    extractor: Arc<dyn ClipExtractor>,
}

impl ClipPipeline {
    /// Builds a pipeline from configuration, selecting the extraction
    /// strategy it names.
    ///
    /// # Errors
    ///
    /// - `ClipError::Extract` - extraction strategy misconfigured
    pub fn new(config: ClipstreamConfig) -> Result<Self> {
        let extractor = extractor_from_config(&config.extraction)?;
        Ok(Self::with_extractor(config, extractor))
    }

    /// Builds a pipeline around an explicit extractor. Used by tests and by
    /// callers that construct a strategy themselves.
    pub fn with_extractor(config: ClipstreamConfig, extractor: Arc<dyn ClipExtractor>) -> Self {
        Self {
            tokens: TokenClient::new(config.platform.clone(), &config.network),
            resolver: ManifestResolver::new(config.platform.clone(), &config.network),
            metadata: MetadataClient::new(config.platform.clone(), &config.network),
            extractor,
        }
    }

    /// Resolves a VOD reference to a playable variant URI.
    ///
    /// Metadata lookup is best-effort: the call succeeds with `"Unknown"`
    /// sentinels when the metadata source is unavailable.
    pub async fn resolve_stream(&self, vod: &VodReference) -> Result<ResolvedStream> {
        let request_id = Uuid::new_v4();
        let vod_id = vod.vod_id().to_string();
        let span = tracing::info_span!("resolve_stream", %request_id, vod_id = %vod_id);

        async move {
            let mut phase = ClipPhase::Pending;
            let result = self.resolve_stream_inner(&vod_id, &mut phase).await;
            settle(&mut phase, &result);
            result
        }
        .instrument(span)
        .await
    }

    /// Cuts a clip out of an already-resolved source locator.
    ///
    /// Normalizes and validates the time range, then runs the configured
    /// extraction strategy. No retries.
    pub async fn extract_clip(
        &self,
        source_locator: &str,
        start: &TimeSpec,
        end: &TimeSpec,
    ) -> Result<ClipResult> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("extract_clip", %request_id);

        async move {
            let mut phase = ClipPhase::Pending;
            let result = self
                .extract_clip_inner(source_locator, start, end, &mut phase)
                .await;
            settle(&mut phase, &result);
            result
        }
        .instrument(span)
        .await
    }

    /// Full pipeline: resolve a VOD, then cut the requested range from its
    /// source-quality variant. One request id and one phase sequence cover
    /// both stages.
    pub async fn clip_vod(
        &self,
        vod: &VodReference,
        start: &TimeSpec,
        end: &TimeSpec,
    ) -> Result<ClipResult> {
        let request_id = Uuid::new_v4();
        let vod_id = vod.vod_id().to_string();
        let span = tracing::info_span!("clip_vod", %request_id, vod_id = %vod_id);

        async move {
            let mut phase = ClipPhase::Pending;
            let result = self.clip_vod_inner(&vod_id, start, end, &mut phase).await;
            settle(&mut phase, &result);
            result
        }
        .instrument(span)
        .await
    }

    async fn clip_vod_inner(
        &self,
        vod_id: &str,
        start: &TimeSpec,
        end: &TimeSpec,
        phase: &mut ClipPhase,
    ) -> Result<ClipResult> {
        let resolved = self.resolve_stream_inner(vod_id, phase).await?;
        self.extract_clip_inner(&resolved.stream_url, start, end, phase)
            .await
    }

    async fn resolve_stream_inner(
        &self,
        vod_id: &str,
        phase: &mut ClipPhase,
    ) -> Result<ResolvedStream> {
        advance(phase, ClipPhase::ResolvingToken);
        let app_token = self.tokens.app_token().await?;
        let playback_token = self.tokens.playback_token(vod_id, &app_token).await?;

        advance(phase, ClipPhase::ResolvingManifest);
        let manifest = self
            .resolver
            .resolve_master_manifest(vod_id, &playback_token)
            .await?;

        let metadata = self.metadata.video_metadata(vod_id, &app_token).await;

        Ok(ResolvedStream {
            stream_url: manifest.variant_uri,
            title: metadata.title,
            duration_label: metadata.duration_label,
        })
    }

    async fn extract_clip_inner(
        &self,
        source_locator: &str,
        start: &TimeSpec,
        end: &TimeSpec,
        phase: &mut ClipPhase,
    ) -> Result<ClipResult> {
        let range = timecode::normalize_range(start, end)?;
        let request = ClipRequest::new(source_locator, range).map_err(ClipError::Extract)?;

        advance(phase, ClipPhase::Extracting);
        let clip = self.extractor.extract(&request).await?;
        tracing::info!(bytes = clip.bytes.len(), "clip extracted");
        Ok(clip)
    }
}

fn advance(phase: &mut ClipPhase, next: ClipPhase) {
    tracing::debug!(from = ?phase, to = ?next, "clip request phase change");
    *phase = next;
}

/// Marks the terminal phase for a finished request.
fn settle<T>(phase: &mut ClipPhase, result: &Result<T>) {
    match result {
        Ok(_) => advance(phase, ClipPhase::Succeeded),
        Err(e) => {
            advance(phase, ClipPhase::Failed(e.kind()));
            tracing::warn!(kind = e.kind().as_str(), error = %e, "clip request failed");
        }
    }
}
