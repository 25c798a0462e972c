//! Admission middleware in front of the forwarder.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use portico_auth::Admission;

use super::router::AppState;
use crate::error::ProblemDetails;
use crate::forward::has_dot_segment;

/// Run the admission gate; rejected requests get a bare 401 and never reach
/// the forwarder.
///
/// Paths with dot segments are refused with 400 first, so the gate and the
/// forwarder always see the same path.
pub async fn require_admission(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if has_dot_segment(request.uri().path()) {
        return ProblemDetails::bad_request("path must not contain dot segments").into_response();
    }

    match state.gate.admit_request(&request) {
        Admission::Unauthorized(_) => StatusCode::UNAUTHORIZED.into_response(),
        Admission::Bypassed | Admission::Authorized { .. } => next.run(request).await,
    }
}
