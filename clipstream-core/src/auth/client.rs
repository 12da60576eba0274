//! HTTP client for the identity and playback-authorization endpoints.

use serde::Deserialize;
use serde_json::json;

use super::{AppToken, AuthError, PlaybackToken};
use crate::config::{NetworkConfig, PlatformConfig};

/// GraphQL query for a VOD-scoped playback access token.
const PLAYBACK_ACCESS_TOKEN_QUERY: &str = "\
query PlaybackAccessToken($login: String!, $isLive: Boolean!, $vodID: ID!, $isVod: Boolean!, $playerType: String!) {\
  videoPlaybackAccessToken(id: $vodID, params: {platform: \"web\", playerBackend: \"mediaplayer\", playerType: $playerType}) @include(if: $isVod) {\
    value\
    signature\
  }\
}";

#[derive(Debug, Deserialize)]
struct CredentialsResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// Client for the platform's identity and playback-authorization services.
pub struct TokenClient {
    platform: PlatformConfig,
    client: reqwest::Client,
    timeout_seconds: u64,
}

impl TokenClient {
    /// Creates a token client using network configuration for timeout and
    /// user agent settings.
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

    /// Performs the client-credentials exchange.
    ///
    /// # Errors
    ///
    /// - `AuthError::MissingCredentials` - client id or secret not configured
    /// - `AuthError::Rejected` - identity endpoint returned non-2xx
    /// - `AuthError::Timeout` - exchange exceeded the request timeout
    pub async fn app_token(&self) -> Result<AppToken, AuthError> {
        if self.platform.client_id.is_empty() {
            return Err(AuthError::MissingCredentials {
                reason: "client id is not configured".to_string(),
            });
        }
        if self.platform.client_secret.is_empty() {
            return Err(AuthError::MissingCredentials {
                reason: "client secret is not configured".to_string(),
            });
        }

        let response = self
            .client
            .post(&self.platform.identity_url)
            .query(&[
                ("client_id", self.platform.client_id.as_str()),
                ("client_secret", self.platform.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let credentials: CredentialsResponse =
            response
                .json()
                .await
                .map_err(|e| AuthError::MalformedResponse {
                    reason: format!("credentials response is not valid JSON: {e}"),
                })?;

        tracing::debug!(
            expires_in = ?credentials.expires_in,
            "acquired application access token"
        );

        Ok(AppToken {
            value: credentials.access_token,
            expires_at: credentials
                .expires_in
                .map(|seconds| chrono::Utc::now() + chrono::Duration::seconds(seconds)),
        })
    }

    /// Requests a signed playback token scoped to one VOD.
    ///
    /// # Errors
    ///
    /// - `AuthError::Rejected` - playback-authorization endpoint returned non-2xx
    /// - `AuthError::MalformedResponse` - response is missing token value or signature
    /// - `AuthError::Timeout` - request exceeded the request timeout
    pub async fn playback_token(
        &self,
        vod_id: &str,
        app_token: &AppToken,
    ) -> Result<PlaybackToken, AuthError> {
        let body = json!({
            "operationName": "PlaybackAccessToken",
            "variables": {
                "isLive": false,
                "login": "",
                "isVod": true,
                "vodID": vod_id,
                "playerType": self.platform.player_type,
            },
            "query": PLAYBACK_ACCESS_TOKEN_QUERY,
        });

        let response = self
            .client
            .post(&self.platform.playback_auth_url)
            .header("Client-ID", &self.platform.client_id)
            .bearer_auth(&app_token.value)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let payload: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| AuthError::MalformedResponse {
                    reason: format!("playback token response is not valid JSON: {e}"),
                })?;

        parse_playback_token(&payload)
    }

    fn transport_error(&self, error: reqwest::Error) -> AuthError {
        if error.is_timeout() {
            AuthError::Timeout {
                seconds: self.timeout_seconds,
            }
        } else {
            AuthError::Transport {
                reason: error.to_string(),
            }
        }
    }
}

/// Extracts a playback token from the authorization response, rejecting any
/// payload missing the token value or signature.
fn parse_playback_token(payload: &serde_json::Value) -> Result<PlaybackToken, AuthError> {
    let token = &payload["data"]["videoPlaybackAccessToken"];

    let value = token["value"].as_str();
    let signature = token["signature"].as_str();

    match (value, signature) {
        (Some(value), Some(signature)) if !value.is_empty() && !signature.is_empty() => {
            Ok(PlaybackToken {
                value: value.to_string(),
                signature: signature.to_string(),
            })
        }
        _ => Err(AuthError::MalformedResponse {
            reason: "playback token response is missing value or signature".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_playback_token() {
        let payload = json!({
            "data": {
                "videoPlaybackAccessToken": {
                    "value": "{\"vod_id\":123}",
                    "signature": "abcdef0123456789"
                }
            }
        });

        let token = parse_playback_token(&payload).unwrap();
        assert_eq!(token.value, "{\"vod_id\":123}");
        assert_eq!(token.signature, "abcdef0123456789");
    }

    #[test]
    fn test_parse_playback_token_rejects_partial_payloads() {
        let missing_signature = json!({
            "data": { "videoPlaybackAccessToken": { "value": "v" } }
        });
        let missing_token = json!({ "data": { "videoPlaybackAccessToken": null } });
        let empty_fields = json!({
            "data": { "videoPlaybackAccessToken": { "value": "", "signature": "" } }
        });

        for payload in [missing_signature, missing_token, empty_fields] {
            assert!(matches!(
                parse_playback_token(&payload),
                Err(AuthError::MalformedResponse { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_app_token_requires_credentials() {
        let platform = PlatformConfig::default();
        let client = TokenClient::new(platform, &NetworkConfig::default());

        let result = client.app_token().await;
        assert!(matches!(
            result,
            Err(AuthError::MissingCredentials { .. })
        ));
    }
}
