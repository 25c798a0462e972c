//! RFC 9457 Problem Details error responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// RFC 9457 Problem Details response.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProblemDetails {
    fn new(slug: &str, title: &str, status: StatusCode, detail: Option<String>) -> Self {
        Self {
            error_type: format!("urn:portico:error:{}", slug),
            title: title.into(),
            status: status.as_u16(),
            detail,
        }
    }

    /// Create a 400 Bad Request error.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(
            "bad-request",
            "Bad Request",
            StatusCode::BAD_REQUEST,
            Some(detail.into()),
        )
    }

    /// Create a 404 Not Found error.
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(
            "not-found",
            "Not Found",
            StatusCode::NOT_FOUND,
            Some(detail.into()),
        )
    }

    /// Create a 413 Payload Too Large error.
    pub fn payload_too_large(detail: impl Into<String>) -> Self {
        Self::new(
            "payload-too-large",
            "Payload Too Large",
            StatusCode::PAYLOAD_TOO_LARGE,
            Some(detail.into()),
        )
    }

    /// Create a 500 Internal Server Error. Carries no detail.
    pub fn internal_error() -> Self {
        Self::new(
            "internal-error",
            "Internal Server Error",
            StatusCode::INTERNAL_SERVER_ERROR,
            None,
        )
    }

    /// Create a 502 Bad Gateway error.
    pub fn bad_gateway(detail: impl Into<String>) -> Self {
        Self::new(
            "bad-gateway",
            "Bad Gateway",
            StatusCode::BAD_GATEWAY,
            Some(detail.into()),
        )
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = Json(&self).into_response();
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}
