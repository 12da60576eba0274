//! Signed master playlist fetching and variant selection.

use super::{ManifestError, ManifestVariant, ResolvedManifest};
use crate::auth::PlaybackToken;
use crate::config::{NetworkConfig, PlatformConfig};

/// Attribute marking the original-quality ("source") track in a master
/// playlist.
const SOURCE_QUALITY_MARKER: &str = "VIDEO=\"chunked\"";

/// Fetches signed master playlists from the platform's edge broker and
/// selects the variant to clip from.
pub struct ManifestResolver {
    platform: PlatformConfig,
    client: reqwest::Client,
    timeout_seconds: u64,
}

impl ManifestResolver {
    /// Creates a resolver using network configuration for timeout and user
    /// agent settings.
    pub fn new(platform: PlatformConfig, network: &NetworkConfig) -> Self {
        Self {
            platform,
            client: reqwest::Client::builder()
                .timeout(network.request_timeout)
                .user_agent(network.user_agent)
                .build()
                .expect("HTTP client creation should not fail"),
            timeout_seconds: network.request_timeout.as_secs(),
        }
    }

    /// Fetches the signed master playlist for a VOD and selects the
    /// best-quality variant URI.
    ///
    /// # Errors
    ///
    /// - `ManifestError::Fetch` - edge broker returned non-2xx
    /// - `ManifestError::Timeout` - fetch exceeded the request timeout
    /// - `ManifestError::NoVariant` - playlist contains no candidate URI
    /// - `ManifestError::Parse` - selected URI is not absolute
    pub async fn resolve_master_manifest(
        &self,
        vod_id: &str,
        token: &PlaybackToken,
    ) -> Result<ResolvedManifest, ManifestError> {
        let url = self.build_playlist_url(vod_id, token);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ManifestError::Timeout {
                    seconds: self.timeout_seconds,
                }
            } else {
                ManifestError::Transport {
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ManifestError::Fetch {
                status: status.as_u16(),
            });
        }

        let raw = response.text().await.map_err(|e| ManifestError::Transport {
            reason: format!("failed reading manifest body: {e}"),
        })?;

        let variants = parse_variants(&raw);
        let variant_uri = select_variant_uri(&raw, &variants)?.to_string();

        tracing::debug!(
            vod_id,
            variant_count = variants.len(),
            "resolved master manifest"
        );

        Ok(ResolvedManifest {
            variant_uri,
            raw,
            variants,
        })
    }

    /// Builds the signed playlist-fetch URL, embedding the URL-encoded token
    /// value and signature plus flags requesting source quality.
    fn build_playlist_url(&self, vod_id: &str, token: &PlaybackToken) -> String {
        format!(
            "{}/vod/{}.m3u8?client_id={}&token={}&sig={}&allow_source=true&allow_audio_only=true&player=web",
            self.platform.edge_url,
            vod_id,
            urlencoding::encode(&self.platform.client_id),
            urlencoding::encode(&token.value),
            urlencoding::encode(&token.signature),
        )
    }
}

/// Parses the variant entries of a master playlist.
///
/// A variant is an `#EXT-X-STREAM-INF` tag line paired with the next
/// non-comment, non-blank line, which carries its URI.
pub fn parse_variants(manifest: &str) -> Vec<ManifestVariant> {
    let lines: Vec<&str> = manifest.lines().map(str::trim).collect();
    let mut variants = Vec::new();

    let mut index = 0;
    while index < lines.len() {
        let line = lines[index];
        if line.starts_with("#EXT-X-STREAM-INF") {
            let mut uri_index = index + 1;
            while uri_index < lines.len()
                && (lines[uri_index].is_empty() || lines[uri_index].starts_with('#'))
            {
                uri_index += 1;
            }

            if uri_index < lines.len() {
                variants.push(ManifestVariant {
                    label: extract_video_label(line).unwrap_or_else(|| "unknown".to_string()),
                    uri: lines[uri_index].to_string(),
                    is_source_quality: line.contains(SOURCE_QUALITY_MARKER),
                });
                index = uri_index;
            }
        }
        index += 1;
    }

    variants
}

/// Two-tier variant selection: the source-quality track if the playlist
/// marks one, otherwise the first absolute `http(s)` URI line. First
/// occurrence wins in both tiers.
///
/// # Errors
///
/// - `ManifestError::NoVariant` - no candidate URI in the document
/// - `ManifestError::Parse` - the selected URI is relative
pub fn select_variant_uri<'a>(
    manifest: &'a str,
    variants: &'a [ManifestVariant],
) -> Result<&'a str, ManifestError> {
    let chosen = variants
        .iter()
        .find(|variant| variant.is_source_quality)
        .map(|variant| variant.uri.as_str())
        .or_else(|| {
            manifest
                .lines()
                .map(str::trim)
                .find(|line| is_absolute_http(line))
        })
        .ok_or(ManifestError::NoVariant)?;

    if !is_absolute_http(chosen) {
        return Err(ManifestError::Parse {
            reason: format!("selected variant URI is not absolute: {chosen}"),
        });
    }

    Ok(chosen)
}

fn is_absolute_http(line: &str) -> bool {
    line.starts_with("http://") || line.starts_with("https://")
}

/// Pulls the value of the `VIDEO="..."` attribute from a stream-inf tag.
fn extract_video_label(tag_line: &str) -> Option<String> {
    let start = tag_line.find("VIDEO=\"")? + "VIDEO=\"".len();
    let end = tag_line[start..].find('"')? + start;
    Some(tag_line[start..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "#EXTM3U\n\
#EXT-X-MEDIA:TYPE=VIDEO,GROUP-ID=\"chunked\",NAME=\"1080p60\"\n\
#EXT-X-STREAM-INF:BANDWIDTH=6500000,RESOLUTION=1920x1080,VIDEO=\"chunked\"\n\
https://edge.example.net/vod/abc/chunked/index-dvr.m3u8\n\
#EXT-X-STREAM-INF:BANDWIDTH=3000000,RESOLUTION=1280x720,VIDEO=\"720p60\"\n\
https://edge.example.net/vod/abc/720p60/index-dvr.m3u8\n";

    #[test]
    fn test_parse_variants() {
        let variants = parse_variants(MASTER);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].label, "chunked");
        assert!(variants[0].is_source_quality);
        assert_eq!(variants[1].label, "720p60");
        assert!(!variants[1].is_source_quality);
    }

    #[test]
    fn test_selects_source_quality_variant() {
        let variants = parse_variants(MASTER);
        let uri = select_variant_uri(MASTER, &variants).unwrap();
        assert_eq!(uri, "https://edge.example.net/vod/abc/chunked/index-dvr.m3u8");
    }

    #[test]
    fn test_source_tag_with_interleaved_comments() {
        let manifest = "#EXT-X-STREAM-INF:BANDWIDTH=1000,VIDEO=\"chunked\"\n\
#EXT-X-SOME-OTHER-TAG\n\
\n\
https://cdn.example.net/720p60/index.m3u8\n";
        let variants = parse_variants(manifest);
        let uri = select_variant_uri(manifest, &variants).unwrap();
        assert_eq!(uri, "https://cdn.example.net/720p60/index.m3u8");
    }

    #[test]
    fn test_falls_back_to_first_absolute_uri() {
        let manifest = "#EXTM3U\n\
#EXT-X-STREAM-INF:BANDWIDTH=1000,VIDEO=\"480p\"\n\
https://cdn.example.net/480p/index.m3u8\n\
https://cdn.example.net/late/index.m3u8\n";
        // No source-marked variant: first absolute URI line wins.
        let variants = parse_variants(manifest);
        let uri = select_variant_uri(manifest, &variants).unwrap();
        assert_eq!(uri, "https://cdn.example.net/480p/index.m3u8");
    }

    #[test]
    fn test_no_candidate_is_an_error() {
        let manifest = "#EXTM3U\n#EXT-X-VERSION:3\n";
        let variants = parse_variants(manifest);
        assert!(matches!(
            select_variant_uri(manifest, &variants),
            Err(ManifestError::NoVariant)
        ));
    }

    #[test]
    fn test_relative_source_variant_is_a_parse_error() {
        let manifest = "#EXT-X-STREAM-INF:BANDWIDTH=1000,VIDEO=\"chunked\"\n\
chunked/index.m3u8\n";
        let variants = parse_variants(manifest);
        assert!(matches!(
            select_variant_uri(manifest, &variants),
            Err(ManifestError::Parse { .. })
        ));
    }
}
