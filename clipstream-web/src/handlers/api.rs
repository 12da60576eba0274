//! API handlers for stream resolution, manifest rewriting, and clip download.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{Response, StatusCode, header};
use axum::response::Json;
use clipstream_core::manifest::{self, ManifestError};
use clipstream_core::{ClipError, ExtractError, TimeSpec, VodReference};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiError;
use crate::server::AppState;

/// HLS playlist content type.
const MPEGURL_MIME: &str = "application/vnd.apple.mpegurl";

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    /// VOD id or platform VOD URL
    pub vod: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub stream_url: String,
    pub title: String,
    pub duration_label: String,
}

/// Resolves a VOD reference to a directly-playable variant URI.
pub async fn api_resolve(
    State(state): State<AppState>,
    Query(params): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let vod = VodReference::parse(&params.vod)?;
    let resolved = state.pipeline.resolve_stream(&vod).await?;

    Ok(Json(ResolveResponse {
        stream_url: resolved.stream_url,
        title: resolved.title,
        duration_label: resolved.duration_label,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ManifestQuery {
    /// Absolute URL of the playlist to fetch and rewrite
    pub src: String,
}

/// Fetches a playlist and rewrites its relative references to absolute URIs
/// so the result stays playable when served from this origin.
pub async fn api_manifest(
    State(state): State<AppState>,
    Query(params): Query<ManifestQuery>,
) -> Result<Response<Body>, ApiError> {
    if !params.src.starts_with("http://") && !params.src.starts_with("https://") {
        return Err(ClipError::Extract(ExtractError::InvalidSource {
            input: params.src,
        })
        .into());
    }

    let response = state.http.get(&params.src).send().await.map_err(|e| {
        ClipError::Manifest(if e.is_timeout() {
            ManifestError::Timeout {
                seconds: state.request_timeout_secs,
            }
        } else {
            ManifestError::Transport {
                reason: e.to_string(),
            }
        })
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ClipError::Manifest(ManifestError::Fetch {
            status: status.as_u16(),
        })
        .into());
    }

    let text = response.text().await.map_err(|e| {
        ClipError::Manifest(ManifestError::Transport {
            reason: format!("failed reading playlist body: {e}"),
        })
    })?;

    let rewritten = manifest::rewrite(&text, &params.src);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, MPEGURL_MIME)
        .body(Body::from(rewritten))
        .unwrap())
}

#[derive(Debug, Deserialize)]
pub struct ClipBody {
    /// Absolute URL of the resolved source (playlist or media file)
    pub source_url: String,
    /// Clip start: seconds or `H:MM:SS`
    pub start: TimeSpec,
    /// Clip end: seconds or `H:MM:SS`
    pub end: TimeSpec,
}

/// Cuts the requested range out of the source and returns it as a download.
pub async fn api_clip(
    State(state): State<AppState>,
    Json(body): Json<ClipBody>,
) -> Result<Response<Body>, ApiError> {
    tracing::info!(source = %body.source_url, "clip download requested");

    let clip = state
        .pipeline
        .extract_clip(&body.source_url, &body.start, &body.end)
        .await?;

    // The range validated during extraction, so these cannot fail here.
    let start = body.start.to_seconds().unwrap_or(0);
    let end = body.end.to_seconds().unwrap_or(0);
    let filename = format!("clip_{start}-{end}.mp4");

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, clip.mime_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .header(header::CONTENT_LENGTH, clip.bytes.len())
        .body(Body::from(clip.bytes))
        .unwrap())
}

/// Liveness endpoint with process uptime.
pub async fn api_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "uptime_seconds": state.server_started_at.elapsed().as_secs(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_body_accepts_mixed_time_forms() {
        let body: ClipBody = serde_json::from_value(json!({
            "source_url": "https://cdn.example.net/index.m3u8",
            "start": 10,
            "end": "0:15"
        }))
        .unwrap();

        assert_eq!(body.start.to_seconds().unwrap(), 10);
        assert_eq!(body.end.to_seconds().unwrap(), 15);
    }

    #[test]
    fn test_clip_body_rejects_missing_fields() {
        let result: Result<ClipBody, _> = serde_json::from_value(json!({
            "source_url": "https://cdn.example.net/index.m3u8",
            "start": 10
        }));
        assert!(result.is_err());
    }
}
