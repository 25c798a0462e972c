//! Merged API description endpoints.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use portico_spec::{serialize, Format};

use super::router::AppState;
use crate::error::ProblemDetails;

/// GET /v3/api-docs-merged
pub async fn merged_json(State(state): State<AppState>) -> Response {
    render(&state, Format::Json).await
}

/// GET /v3/api-docs-merged.yaml
pub async fn merged_yaml(State(state): State<AppState>) -> Response {
    render(&state, Format::Yaml).await
}

async fn render(state: &AppState, format: Format) -> Response {
    let merged = state.aggregator.aggregate().await;

    match serialize(&merged, format) {
        Ok(body) => ([(header::CONTENT_TYPE, format.content_type())], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize merged document");
            ProblemDetails::internal_error().into_response()
        }
    }
}
