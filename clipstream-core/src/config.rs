//! Centralized configuration for Clipstream.
//!
//! All tunable parameters and endpoint settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::path::PathBuf;
use std::time::Duration;

/// Central configuration for all Clipstream components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct ClipstreamConfig {
    pub platform: PlatformConfig,
    pub network: NetworkConfig,
    pub extraction: ExtractionConfig,
}

/// Upstream video platform endpoints and credentials.
///
/// Credentials are consumed from the environment; they have no defaults and
/// an empty client id/secret fails token acquisition with a config error.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Application client id registered with the platform
    pub client_id: String,
    /// Application client secret for the credentials exchange
    pub client_secret: String,
    /// OAuth client-credentials token endpoint
    pub identity_url: String,
    /// GraphQL playback-authorization endpoint
    pub playback_auth_url: String,
    /// Edge broker serving signed master playlists
    pub edge_url: String,
    /// REST endpoint for best-effort video metadata
    pub metadata_url: String,
    /// Player type reported in playback token requests
    pub player_type: &'static str,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            identity_url: "https://id.twitch.tv/oauth2/token".to_string(),
            playback_auth_url: "https://gql.twitch.tv/gql".to_string(),
            edge_url: "https://usher.ttvnw.net".to_string(),
            metadata_url: "https://api.twitch.tv/helix/videos".to_string(),
            player_type: "embed",
        }
    }
}

/// HTTP client behavior shared by all upstream calls.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Per-request timeout for token, manifest, and metadata calls
    pub request_timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: &'static str,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            user_agent: "clipstream/0.1.0",
        }
    }
}

/// Which extraction strategy serves clip requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Invoke ffmpeg as a local subprocess
    LocalProcess,
    /// Delegate to a remote extraction service
    RemoteDelegate,
}

/// Clip extraction engine configuration.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Strategy used for `extract` calls
    pub strategy: ExtractionStrategy,
    /// ffmpeg binary to invoke for the local strategy
    pub ffmpeg_path: String,
    /// Base URL of the remote extraction service, if delegating
    pub delegate_url: Option<String>,
    /// Wall-clock limit for one extraction (subprocess or delegate call)
    pub extraction_timeout: Duration,
    /// Directory for temporary clip output (None = system temp dir)
    pub temp_dir: Option<PathBuf>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: ExtractionStrategy::LocalProcess,
            ffmpeg_path: "ffmpeg".to_string(),
            delegate_url: None,
            extraction_timeout: Duration::from_secs(120),
            temp_dir: None,
        }
    }
}

impl ClipstreamConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via `CLIPSTREAM_*` environment variables
    /// while maintaining sensible defaults for everything but credentials.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(client_id) = std::env::var("CLIPSTREAM_CLIENT_ID") {
            config.platform.client_id = client_id;
        }

        if let Ok(client_secret) = std::env::var("CLIPSTREAM_CLIENT_SECRET") {
            config.platform.client_secret = client_secret;
        }

        if let Ok(timeout) = std::env::var("CLIPSTREAM_REQUEST_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.network.request_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(strategy) = std::env::var("CLIPSTREAM_STRATEGY") {
            match strategy.as_str() {
                "local" => config.extraction.strategy = ExtractionStrategy::LocalProcess,
                "remote" => config.extraction.strategy = ExtractionStrategy::RemoteDelegate,
                _ => {}
            }
        }

        if let Ok(delegate_url) = std::env::var("CLIPSTREAM_DELEGATE_URL") {
            config.extraction.delegate_url = Some(delegate_url);
        }

        if let Ok(ffmpeg_path) = std::env::var("CLIPSTREAM_FFMPEG_PATH") {
            config.extraction.ffmpeg_path = ffmpeg_path;
        }

        if let Ok(timeout) = std::env::var("CLIPSTREAM_EXTRACTION_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.extraction.extraction_timeout = Duration::from_secs(seconds);
            }
        }

        config
    }

    /// Creates a configuration suitable for tests: short timeouts and
    /// placeholder credentials so no call reaches a real platform.
    pub fn for_testing() -> Self {
        let mut config = Self::default();
        config.platform.client_id = "test-client-id".to_string();
        config.platform.client_secret = "test-client-secret".to_string();
        config.network.request_timeout = Duration::from_secs(1);
        config.extraction.extraction_timeout = Duration::from_secs(5);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ClipstreamConfig::default();

        assert!(config.platform.client_id.is_empty());
        assert_eq!(config.platform.player_type, "embed");
        assert_eq!(config.network.request_timeout, Duration::from_secs(15));
        assert_eq!(config.extraction.strategy, ExtractionStrategy::LocalProcess);
        assert_eq!(config.extraction.ffmpeg_path, "ffmpeg");
        assert!(config.extraction.delegate_url.is_none());
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("CLIPSTREAM_CLIENT_ID", "abc123");
            std::env::set_var("CLIPSTREAM_REQUEST_TIMEOUT", "30");
            std::env::set_var("CLIPSTREAM_STRATEGY", "remote");
            std::env::set_var("CLIPSTREAM_DELEGATE_URL", "http://extractor.internal:9000");
        }

        let config = ClipstreamConfig::from_env();

        assert_eq!(config.platform.client_id, "abc123");
        assert_eq!(config.network.request_timeout, Duration::from_secs(30));
        assert_eq!(
            config.extraction.strategy,
            ExtractionStrategy::RemoteDelegate
        );
        assert_eq!(
            config.extraction.delegate_url.as_deref(),
            Some("http://extractor.internal:9000")
        );

        // Unknown strategy values keep the default
        unsafe {
            std::env::set_var("CLIPSTREAM_STRATEGY", "teleport");
        }
        let config = ClipstreamConfig::from_env();
        assert_eq!(config.extraction.strategy, ExtractionStrategy::LocalProcess);

        // Cleanup
        unsafe {
            std::env::remove_var("CLIPSTREAM_CLIENT_ID");
            std::env::remove_var("CLIPSTREAM_REQUEST_TIMEOUT");
            std::env::remove_var("CLIPSTREAM_STRATEGY");
            std::env::remove_var("CLIPSTREAM_DELEGATE_URL");
        }
    }
}
