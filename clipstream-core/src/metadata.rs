//! Best-effort video metadata lookup.
//!
//! Title and duration are cosmetic: if the metadata source is unavailable or
//! returns something unexpected the pipeline degrades to sentinel values
//! instead of failing the resolution.

use serde_json::Value;

use crate::auth::AppToken;
use crate::config::{NetworkConfig, PlatformConfig};

/// Sentinel used when metadata cannot be fetched.
const UNKNOWN: &str = "Unknown";

/// Cosmetic VOD metadata alongside a resolved stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub duration_label: String,
}

impl VideoMetadata {
    pub fn unknown() -> Self {
        Self {
            title: UNKNOWN.to_string(),
            duration_label: UNKNOWN.to_string(),
        }
    }
}

/// Client for the platform's video metadata API.
pub struct MetadataClient {
    platform: PlatformConfig,
    client: reqwest::Client,
}

impl MetadataClient {
    pub fn new(platform: PlatformConfig, network: &NetworkConfig) -> Self {
        Self {
            platform,
            client: reqwest::Client::builder()
                .timeout(network.request_timeout)
                .user_agent(network.user_agent)
                .build()
                .expect("HTTP client creation should not fail"),
        }
    }

    /// Looks up title and duration for a VOD, degrading to `"Unknown"`
    /// sentinels on any failure.
    pub async fn video_metadata(&self, vod_id: &str, app_token: &AppToken) -> VideoMetadata {
        match self.try_fetch(vod_id, app_token).await {
            Some(metadata) => metadata,
            None => {
                tracing::warn!(vod_id, "metadata lookup failed, using sentinels");
                VideoMetadata::unknown()
            }
        }
    }

    async fn try_fetch(&self, vod_id: &str, app_token: &AppToken) -> Option<VideoMetadata> {
        let response = self
            .client
            .get(&self.platform.metadata_url)
            .query(&[("id", vod_id)])
            .header("Client-Id", &self.platform.client_id)
            .bearer_auth(&app_token.value)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let payload: Value = response.json().await.ok()?;
        parse_metadata(&payload)
    }
}

/// Pulls title and duration from the first entry of a metadata response.
fn parse_metadata(payload: &Value) -> Option<VideoMetadata> {
    let entry = payload["data"].as_array()?.first()?;
    Some(VideoMetadata {
        title: entry["title"].as_str().unwrap_or(UNKNOWN).to_string(),
        duration_label: entry["duration"].as_str().unwrap_or(UNKNOWN).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_metadata() {
        let payload = json!({
            "data": [
                { "id": "123", "title": "Speedrun VOD", "duration": "3h21m8s" }
            ]
        });
        let metadata = parse_metadata(&payload).unwrap();
        assert_eq!(metadata.title, "Speedrun VOD");
        assert_eq!(metadata.duration_label, "3h21m8s");
    }

    #[test]
    fn test_parse_metadata_partial_entry() {
        let payload = json!({ "data": [ { "id": "123" } ] });
        let metadata = parse_metadata(&payload).unwrap();
        assert_eq!(metadata.title, "Unknown");
        assert_eq!(metadata.duration_label, "Unknown");
    }

    #[test]
    fn test_parse_metadata_empty_or_malformed() {
        assert_eq!(parse_metadata(&json!({ "data": [] })), None);
        assert_eq!(parse_metadata(&json!({ "error": "nope" })), None);
    }
}
