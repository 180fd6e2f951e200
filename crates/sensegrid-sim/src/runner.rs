//! Simulation pipeline orchestration
//!
//! generate → build topology → (bounded health polling) → seed telemetry →
//! propagate edges → query round → summarize. The only fatal paths are
//! configuration-level: unreadable schemas and topology nodes without an
//! endpoint mapping. Everything downstream degrades unit by unit.

use crate::config::{ConfigError, HealthSettings, SimConfig};
use crate::report::Report;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sensegrid_core::{
    build_topology, generate_fields, FieldSchema, NodeRecord, QueryExpr, SchemaError, Topology,
};
use sensegrid_dispatch::{
    DispatchError, EndpointMap, Harness, HttpRelayTransport, NodeTransport, ResourceProbe,
    summarize,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fatal simulation errors
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Topology plus the final report of one run
#[derive(Debug)]
pub struct SimulationOutcome {
    pub topology: Topology,
    pub report: Report,
}

/// Generate node records and assemble the topology, without dispatching
///
/// `seed` overrides the config's seed when present; with neither, the RNG
/// is entropy-seeded.
pub fn build_topology_from_config(
    config: &SimConfig,
    seed: Option<u64>,
) -> Result<Topology, SimError> {
    let mut rng = match seed.or(config.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let now = Utc::now();

    let mut records = Vec::with_capacity(config.nodes.len());
    for entry in &config.nodes {
        let schema = FieldSchema::from_file(&entry.schema)?;
        let fields = generate_fields(&schema, &mut rng, now);
        let record = NodeRecord::new(entry.id.clone(), schema.node_type(), fields);
        debug!("Generated {} as {}", record.id, record.node_type);
        records.push(record);
    }

    let topology = build_topology(records);
    info!(
        "Built topology: {} nodes, {} edges",
        topology.node_count(),
        topology.edge_count()
    );
    Ok(topology)
}

/// Run the complete simulation pipeline
pub async fn run_simulation(
    config: &SimConfig,
    expression: &QueryExpr,
    seed: Option<u64>,
) -> Result<SimulationOutcome, SimError> {
    let probe = ResourceProbe::start();

    let topology = build_topology_from_config(config, seed)?;

    let mut endpoints = EndpointMap::new();
    for entry in &config.nodes {
        endpoints.insert(&entry.id, &entry.endpoint);
    }
    // A topology node without an address is fatal before any dispatch.
    endpoints.validate_for(&topology)?;

    let dispatch_config = config.dispatch.to_dispatch_config();
    let transport: Arc<dyn NodeTransport> = Arc::new(HttpRelayTransport::new(
        endpoints,
        dispatch_config.invoke_timeout,
    ));

    wait_for_nodes(transport.as_ref(), &topology, &config.health).await;

    let harness = Harness::new(Arc::clone(&transport), dispatch_config);
    let run = harness.run(&topology, expression).await;

    let summary = summarize(&run.results, run.started_at, probe.snapshot());
    let report = Report::build(&topology, &run, summary, expression);

    Ok(SimulationOutcome { topology, report })
}

/// Bounded health polling before dispatch starts
///
/// A node that never answers is logged and left in the run; its units will
/// surface as error outcomes rather than aborting anything.
async fn wait_for_nodes(
    transport: &dyn NodeTransport,
    topology: &Topology,
    settings: &HealthSettings,
) {
    for node_id in topology.node_ids() {
        let mut healthy = false;
        for attempt in 1..=settings.attempts {
            if matches!(transport.health(node_id).await, Ok(true)) {
                healthy = true;
                break;
            }
            debug!(
                "Node '{}' not healthy yet (attempt {}/{})",
                node_id, attempt, settings.attempts
            );
            if attempt < settings.attempts {
                tokio::time::sleep(settings.interval()).await;
            }
        }

        if !healthy {
            warn!(
                "Node '{}' did not answer health checks; its dispatch units will fail",
                node_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DispatchSettings, NodeEntry};
    use async_trait::async_trait;
    use sensegrid_core::{Ack, Edge, QueryResponse};
    use sensegrid_dispatch::TransportError;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const HIGHWAY: &str = r#"{
        "title": "Highway Sensor",
        "properties": {
            "emergency_cars": {"type": "boolean"},
            "timestamp": {"type": "string"}
        }
    }"#;

    const CROSSROAD: &str = r#"{
        "title": "Small Crossroad",
        "properties": {
            "emergency_cars": {"type": "boolean"},
            "CO2": {"type": "number", "minimum": 300, "maximum": 600}
        }
    }"#;

    fn write_schema(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn test_config(dir: &TempDir) -> SimConfig {
        SimConfig {
            nodes: vec![
                NodeEntry {
                    id: "Node1".to_string(),
                    endpoint: "http://localhost:5001".to_string(),
                    schema: write_schema(dir, "highway.json", HIGHWAY),
                },
                NodeEntry {
                    id: "Node2".to_string(),
                    endpoint: "http://localhost:5002".to_string(),
                    schema: write_schema(dir, "crossroad.json", CROSSROAD),
                },
            ],
            seed: Some(42),
            dispatch: DispatchSettings::default(),
            health: HealthSettings {
                attempts: 1,
                interval_secs: 0,
            },
        }
    }

    #[test]
    fn test_build_topology_from_config() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let topology = build_topology_from_config(&config, None).unwrap();
        assert_eq!(topology.node_count(), 2);
        // highway 1 spec + small_crossroad 2 specs, one target each
        assert_eq!(topology.edge_count(), 3);
    }

    #[test]
    fn test_seeded_builds_generate_identical_fields() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let a = build_topology_from_config(&config, Some(7)).unwrap();
        let b = build_topology_from_config(&config, Some(7)).unwrap();
        assert_eq!(a.nodes[0].fields, b.nodes[0].fields);
        assert_eq!(a.edges, b.edges);
    }

    #[test]
    fn test_missing_schema_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.nodes[0].schema = dir.path().join("missing.json");

        let err = build_topology_from_config(&config, None).unwrap_err();
        assert!(matches!(err, SimError::Schema(_)));
    }

    /// Transport double that answers everything successfully.
    struct AlwaysUpTransport;

    #[async_trait]
    impl NodeTransport for AlwaysUpTransport {
        async fn ingest_telemetry(
            &self,
            _node: &str,
            _record: &NodeRecord,
        ) -> Result<Ack, TransportError> {
            Ok(Ack::success("stored"))
        }

        async fn push_edge(&self, _source: &str, _edge: &Edge) -> Result<Ack, TransportError> {
            Ok(Ack::success("stored"))
        }

        async fn query(
            &self,
            _source: &str,
            _target: &str,
            _expression: &QueryExpr,
        ) -> Result<QueryResponse, TransportError> {
            Ok(QueryResponse::success(vec![]))
        }

        async fn health(&self, _node: &str) -> Result<bool, TransportError> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_wait_for_nodes_is_bounded() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let topology = build_topology_from_config(&config, None).unwrap();

        // Healthy transport: returns immediately without sleeping through
        // the full attempt budget.
        let settings = HealthSettings {
            attempts: 1000,
            interval_secs: 60,
        };
        wait_for_nodes(&AlwaysUpTransport, &topology, &settings).await;
    }

    #[test]
    fn test_missing_endpoint_mapping_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let topology = build_topology_from_config(&config, None).unwrap();

        let mut endpoints = EndpointMap::new();
        endpoints.insert("Node1", &config.nodes[0].endpoint);

        let err = endpoints.validate_for(&topology).unwrap_err();
        assert!(matches!(err, DispatchError::MissingEndpoint(id) if id == "Node2"));
    }
}
