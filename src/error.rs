use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use std::fmt;

/// The gateway's error taxonomy (SPEC_FULL.md §7). Each variant maps to
/// exactly one HTTP status at the frontend boundary.
#[derive(Debug)]
pub enum GatewayError {
    /// Unparseable JSON, wrong outer shape, or a `method` field of the wrong type.
    MalformedEnvelope(String),
    /// An array body with more than one element.
    BatchNotSupported,
    /// A range or limit parameter exceeded its allowed bound.
    OversizedRange(String),
    /// The target pool's queue was full at submission time.
    PoolSaturated,
    /// The upstream connection failed or returned an empty body.
    UpstreamUnavailable(String),
    /// The REST path did not match `/v1/<api>/<method>`.
    InvalidRestPath,
    /// Failed to serialize/deserialize JSON.
    Json(serde_json::Error),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedEnvelope(e) => write!(f, "malformed envelope: {e}"),
            Self::BatchNotSupported => write!(f, "request array must have exactly one element"),
            Self::OversizedRange(e) => write!(f, "oversized range: {e}"),
            Self::PoolSaturated => write!(f, "upstream pool saturated"),
            Self::UpstreamUnavailable(e) => write!(f, "upstream unavailable: {e}"),
            Self::InvalidRestPath => write!(f, "invalid REST path, expected /v1/<api>/<method>"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedEnvelope(_) | Self::InvalidRestPath | Self::Json(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::BatchNotSupported | Self::OversizedRange(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::PoolSaturated => StatusCode::GATEWAY_TIMEOUT,
            Self::UpstreamUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
