//! Remote delegate extraction strategy.

use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;

use super::{ClipExtractor, ClipRequest, ClipResult, ExtractError, mp4};
use crate::timecode::format_timestamp;

/// Wire payload of the delegate service contract. Times are sent as
/// `H:MM:SS` strings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DelegateClipRequest<'a> {
    source_locator: &'a str,
    start_time: String,
    end_time: String,
}

impl<'a> DelegateClipRequest<'a> {
    fn from_clip_request(request: &'a ClipRequest) -> Self {
        Self {
            source_locator: request.source(),
            start_time: format_timestamp(request.range.start_seconds),
            end_time: format_timestamp(request.range.end_seconds),
        }
    }
}

/// Extracts clips by delegating to a remote extraction service that returns
/// the trimmed binary directly in its response body.
pub struct RemoteDelegateExtractor {
    delegate_url: String,
    client: reqwest::Client,
    timeout_seconds: u64,
}

impl RemoteDelegateExtractor {
    pub fn new(delegate_url: String, timeout: Duration) -> Self {
        Self {
            delegate_url,
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("HTTP client creation should not fail"),
            timeout_seconds: timeout.as_secs(),
        }
    }
}

#[async_trait::async_trait]
impl ClipExtractor for RemoteDelegateExtractor {
    async fn extract(&self, request: &ClipRequest) -> Result<ClipResult, ExtractError> {
        let payload = DelegateClipRequest::from_clip_request(request);

        tracing::debug!(
            delegate = %self.delegate_url,
            start = %payload.start_time,
            end = %payload.end_time,
            "delegating clip extraction"
        );

        let response = self
            .client
            .post(&self.delegate_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractError::Timeout {
                        seconds: self.timeout_seconds,
                    }
                } else {
                    ExtractError::EngineFailed {
                        detail: format!("delegate request failed: {e}"),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ExtractError::EngineFailed {
                detail: format!("delegate returned status {status}: {detail}"),
            });
        }

        let clip_bytes: Bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ExtractError::Timeout {
                    seconds: self.timeout_seconds,
                }
            } else {
                ExtractError::EngineFailed {
                    detail: format!("failed reading delegate response body: {e}"),
                }
            }
        })?;

        mp4::validate_clip_bytes(&clip_bytes)?;

        tracing::info!(bytes = clip_bytes.len(), "clip extracted via delegate");

        Ok(ClipResult {
            bytes: clip_bytes,
            mime_type: mp4::MP4_MIME.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timecode::TimeRange;

    #[test]
    fn test_delegate_payload_shape() {
        let request = ClipRequest::new(
            "https://cdn.example.net/vod/index.m3u8",
            TimeRange {
                start_seconds: 3723,
                end_seconds: 3730,
            },
        )
        .unwrap();

        let payload = DelegateClipRequest::from_clip_request(&request);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["sourceLocator"], "https://cdn.example.net/vod/index.m3u8");
        assert_eq!(json["startTime"], "1:02:03");
        assert_eq!(json["endTime"], "1:02:10");
    }
}
