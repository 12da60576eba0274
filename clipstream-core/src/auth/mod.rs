//! Platform token acquisition.
//!
//! Two credentials are needed before a manifest can be fetched: an
//! application access token from the client-credentials exchange, and a
//! short-lived signed playback token scoped to one VOD. Both are held only
//! for the duration of a single resolution and threaded explicitly through
//! the pipeline - there is no process-wide token state.

mod client;

use chrono::{DateTime, Utc};
pub use client::TokenClient;

/// Errors from token acquisition.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing platform credentials: {reason}")]
    MissingCredentials { reason: String },

    #[error("upstream auth rejected the request with status {status}: {detail}")]
    Rejected { status: u16, detail: String },

    #[error("malformed auth response: {reason}")]
    MalformedResponse { reason: String },

    #[error("auth request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("auth transport error: {reason}")]
    Transport { reason: String },
}

/// Application-level access token from the client-credentials exchange.
#[derive(Clone)]
pub struct AppToken {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AppToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

impl std::fmt::Debug for AppToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Signed, single-use playback token scoped to one VOD.
///
/// Both fields are required: a token missing either cannot produce a valid
/// signed manifest request downstream. Values are redacted from Debug output
/// so they cannot leak into logs.
#[derive(Clone)]
pub struct PlaybackToken {
    pub value: String,
    pub signature: String,
}

impl std::fmt::Debug for PlaybackToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackToken")
            .field("value", &"<redacted>")
            .field("signature", &"<redacted>")
            .finish()
    }
}
