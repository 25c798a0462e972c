//! Axum router configuration.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware,
    response::Response,
    routing::get,
    Router,
};
use portico_aggregator::Aggregator;
use portico_auth::AdmissionGate;
use tower_http::trace::TraceLayer;

use super::{admission, docs, health};
use crate::forward::Forwarder;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub gate: Arc<AdmissionGate>,
    pub forwarder: Arc<Forwarder>,
}

async fn proxy(State(state): State<AppState>, request: Request) -> Response {
    state.forwarder.forward(request).await
}

/// Create the gateway router.
///
/// The merged-document and health endpoints are served directly; every other
/// request goes through the admission gate to the forwarder.
pub fn create_router(state: AppState) -> Router {
    let proxied = Router::new()
        .fallback(proxy)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admission::require_admission,
        ));

    Router::new()
        .route("/v3/api-docs-merged", get(docs::merged_json))
        .route("/v3/api-docs-merged.yaml", get(docs::merged_yaml))
        .route("/health", get(health::health_check))
        .merge(proxied)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
