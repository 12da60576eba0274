//! Mapping from pipeline errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clipstream_core::{ClipError, ErrorClass};
use serde_json::json;

/// Wrapper turning a `ClipError` into a status-mapped JSON response.
///
/// Client input errors map to 400, upstream platform failures to 503,
/// malformed upstream responses to 502, and extraction failures to 500. The
/// body carries the message and a stable `kind` tag so callers can
/// distinguish transient outages from structural breakage.
#[derive(Debug)]
pub struct ApiError(pub ClipError);

impl From<ClipError> for ApiError {
    fn from(error: ClipError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = match kind.class() {
            ErrorClass::Client => StatusCode::BAD_REQUEST,
            ErrorClass::Upstream => StatusCode::SERVICE_UNAVAILABLE,
            ErrorClass::UpstreamFormat => StatusCode::BAD_GATEWAY,
            ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.0.to_string(),
            "kind": kind.as_str(),
        }));

        (status, body).into_response()
    }
}
