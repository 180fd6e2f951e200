//! Transport abstraction over the remote node contract
//!
//! The harness never talks HTTP directly; it invokes this trait. The HTTP
//! implementation realizes the "source executes the call" semantics through
//! the node service's relay surface: the harness contacts the source, the
//! source contacts the target and relays the answer back.

use crate::endpoint::EndpointMap;
use crate::error::TransportError;
use async_trait::async_trait;
use sensegrid_core::{
    Ack, Edge, NodeRecord, QueryExpr, QueryResponse, RelayEdgeRequest, RelayQueryRequest,
};
use std::time::Duration;

/// Abstract invoke capability against node endpoints
#[async_trait]
pub trait NodeTransport: Send + Sync {
    /// Deliver a node's telemetry record to its own endpoint
    async fn ingest_telemetry(
        &self,
        node: &str,
        record: &NodeRecord,
    ) -> Result<Ack, TransportError>;

    /// Instruct `source` to deliver an edge to the edge's target node
    async fn push_edge(&self, source: &str, edge: &Edge) -> Result<Ack, TransportError>;

    /// Instruct `source` to run a query against `target`
    async fn query(
        &self,
        source: &str,
        target: &str,
        expression: &QueryExpr,
    ) -> Result<QueryResponse, TransportError>;

    /// Whether the node's endpoint answers its health check
    async fn health(&self, node: &str) -> Result<bool, TransportError>;
}

/// HTTP transport backed by the node service's relay surface
pub struct HttpRelayTransport {
    client: reqwest::Client,
    endpoints: EndpointMap,
}

impl HttpRelayTransport {
    pub fn new(endpoints: EndpointMap, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, endpoints }
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, TransportError>
    where
        B: serde::Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let response = self.client.post(url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::BadStatus { status, body });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            TransportError::MalformedResponse(format!("{} (raw: {:.80})", e, text))
        })
    }
}

#[async_trait]
impl NodeTransport for HttpRelayTransport {
    async fn ingest_telemetry(
        &self,
        node: &str,
        record: &NodeRecord,
    ) -> Result<Ack, TransportError> {
        let endpoint = self.endpoints.require(node)?;
        self.post_json(&endpoint.url("/data"), record).await
    }

    async fn push_edge(&self, source: &str, edge: &Edge) -> Result<Ack, TransportError> {
        let source_ep = self.endpoints.require(source)?;
        let target_ep = self.endpoints.require(&edge.target)?;

        let request = RelayEdgeRequest {
            target: target_ep.base_url().to_string(),
            edge: edge.clone(),
        };
        self.post_json(&source_ep.url("/relay/edge"), &request).await
    }

    async fn query(
        &self,
        source: &str,
        target: &str,
        expression: &QueryExpr,
    ) -> Result<QueryResponse, TransportError> {
        let source_ep = self.endpoints.require(source)?;
        let target_ep = self.endpoints.require(target)?;

        let request = RelayQueryRequest {
            target: target_ep.base_url().to_string(),
            expression: expression.clone(),
        };
        self.post_json(&source_ep.url("/relay/query"), &request).await
    }

    async fn health(&self, node: &str) -> Result<bool, TransportError> {
        let endpoint = self.endpoints.require(node)?;
        match self.client.get(endpoint.url("/health")).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}
