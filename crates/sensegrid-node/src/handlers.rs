//! HTTP request handlers for the node service

use crate::error::ApiError;
use crate::query::evaluate;
use crate::store::NodeStore;
use axum::{
    extract::State,
    response::{Html, Json},
};
use sensegrid_core::{
    Ack, Edge, FieldValue, NodeRecord, QueryExpr, QueryOp, QueryRequest, QueryResponse,
    RelayEdgeRequest, RelayQueryRequest,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<NodeStore>,
    /// Outbound client for relay operations toward peer nodes
    pub relay: reqwest::Client,
}

impl AppState {
    pub fn new(store: Arc<NodeStore>, relay_timeout: Duration) -> Self {
        let relay = reqwest::Client::builder()
            .timeout(relay_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { store, relay }
    }
}

/// Health check response body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub node_id: String,
    pub uptime_secs: u64,
    pub telemetry_count: usize,
    pub edge_count: usize,
}

/// GET / - liveness line
pub async fn index() -> &'static str {
    "SenseGrid node running"
}

/// GET /health - reachability plus store counters
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        node_id: state.store.node_id().to_string(),
        uptime_secs: state.store.uptime_secs(),
        telemetry_count: state.store.telemetry_count(),
        edge_count: state.store.edge_count(),
    })
}

/// POST /data - ingest one telemetry record
pub async fn ingest_data(
    State(state): State<Arc<AppState>>,
    Json(record): Json<NodeRecord>,
) -> Json<Ack> {
    debug!("Ingesting telemetry from {}", record.id);
    state.store.insert_telemetry(record);
    Json(Ack::success("Sensor stored"))
}

/// POST /edge - ingest one edge
pub async fn ingest_edge(State(state): State<Arc<AppState>>, Json(edge): Json<Edge>) -> Json<Ack> {
    debug!("Ingesting edge {} -> {} ({})", edge.source, edge.target, edge.edge_type);
    state.store.insert_edge(edge);
    Json(Ack::success("Edge stored"))
}

/// POST /query - evaluate a bound predicate against stored telemetry
pub async fn run_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResponse> {
    let records = state.store.telemetry();
    let rows = evaluate(&request.expression, &records);
    debug!(
        "Query {} matched {} of {} records",
        request.expression,
        rows.len(),
        records.len()
    );
    Json(QueryResponse::success(rows))
}

/// GET /status - human-readable green/red indicator
///
/// Green when any stored record reports emergency_cars == true; the fixed
/// predicate goes through the same bound evaluation as /query.
pub async fn status_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let expression = QueryExpr::new("emergency_cars", QueryOp::Eq, FieldValue::Boolean(true));
    let matches = evaluate(&expression, &state.store.telemetry());
    let light = if matches.is_empty() {
        "Red light"
    } else {
        "Green light"
    };
    Html(format!("<h1>{}</h1>", light))
}

/// POST /relay/edge - deliver an edge to a peer on the caller's behalf
pub async fn relay_edge(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RelayEdgeRequest>,
) -> Result<Json<Ack>, ApiError> {
    let url = peer_url(&request.target, "/edge")?;
    debug!("Relaying edge to {}", url);

    let response = state
        .relay
        .post(&url)
        .json(&request.edge)
        .send()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        warn!("Peer {} rejected edge: {}", url, status);
        return Err(ApiError::Upstream(format!("peer returned {}", status)));
    }

    let ack = response
        .json::<Ack>()
        .await
        .map_err(|e| ApiError::Upstream(format!("malformed peer ack: {}", e)))?;
    Ok(Json(ack))
}

/// POST /relay/query - query a peer on the caller's behalf
pub async fn relay_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RelayQueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let url = peer_url(&request.target, "/query")?;
    debug!("Relaying query {} to {}", request.expression, url);

    let body = QueryRequest {
        expression: request.expression,
    };
    let response = state
        .relay
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        warn!("Peer {} rejected query: {}", url, status);
        return Err(ApiError::Upstream(format!("peer returned {}", status)));
    }

    let answer = response
        .json::<QueryResponse>()
        .await
        .map_err(|e| ApiError::Upstream(format!("malformed peer response: {}", e)))?;
    Ok(Json(answer))
}

/// Join a peer base URL with a service path, rejecting non-HTTP targets
fn peer_url(target: &str, path: &str) -> Result<String, ApiError> {
    if !target.starts_with("http://") && !target.starts_with("https://") {
        return Err(ApiError::BadRequest(format!(
            "relay target '{}' is not an http(s) URL",
            target
        )));
    }
    Ok(format!("{}{}", target.trim_end_matches('/'), path))
}
