//! Node service router setup

use crate::handlers::{self, AppState};
use axum::http::StatusCode;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Create the node service router
pub fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Liveness
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        // Ingest endpoints
        .route("/data", post(handlers::ingest_data))
        .route("/edge", post(handlers::ingest_edge))
        // Query endpoints
        .route("/query", post(handlers::run_query))
        .route("/status", get(handlers::status_page))
        // Relay surface: this node contacts a peer on the caller's behalf
        .route("/relay/edge", post(handlers::relay_edge))
        .route("/relay/query", post(handlers::relay_query))
        // Add middleware
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Add state
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NodeStore;

    #[test]
    fn test_router_creation() {
        let state = Arc::new(AppState::new(
            Arc::new(NodeStore::new("test-node")),
            Duration::from_secs(5),
        ));
        let _router = create_router(state, Duration::from_secs(30));
    }
}
