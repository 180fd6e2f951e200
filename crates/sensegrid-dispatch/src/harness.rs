//! Two-phase dispatch harness
//!
//! Phase A pushes every computed edge to its target through the source
//! node; Phase B issues one query per ordered node pair, measuring
//! round-trip latency. Phase B never starts before Phase A's fan-out has
//! fully completed, since queries observe state that depends on delivered
//! edges.
//!
//! Fan-out uses a bounded in-flight task set: each unit of work runs in its
//! own task and returns its own result slot; slots are merged after the
//! join, so no shared sequence is ever appended concurrently.

use crate::error::TransportError;
use crate::summary::{QueryOutcome, QueryResult};
use crate::transport::NodeTransport;
use sensegrid_core::{NodeRecord, QueryExpr, Status, Topology};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Harness configuration
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Maximum number of in-flight invocations per phase
    pub max_in_flight: usize,
    /// Timeout applied to every remote invocation
    pub invoke_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 8,
            invoke_timeout: Duration::from_secs(30),
        }
    }
}

/// One failed unit of work within a fan-out phase
#[derive(Debug, Clone)]
pub struct PhaseFailure {
    /// Human-readable unit description, e.g. `Node1 -> Node2 (emergency)`
    pub unit: String,
    pub error: String,
}

/// Outcome counts for one fan-out phase
#[derive(Debug, Clone, Default)]
pub struct PhaseReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<PhaseFailure>,
}

impl PhaseReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    fn merge(outcomes: Vec<(String, Result<(), String>)>) -> Self {
        let mut report = PhaseReport {
            attempted: outcomes.len(),
            ..Default::default()
        };
        for (unit, outcome) in outcomes {
            match outcome {
                Ok(()) => report.succeeded += 1,
                Err(error) => {
                    warn!("Dispatch unit failed: {} ({})", unit, error);
                    report.failures.push(PhaseFailure { unit, error });
                }
            }
        }
        report
    }
}

/// Full outcome of one dispatched run
#[derive(Debug)]
pub struct RunReport {
    pub telemetry: PhaseReport,
    pub edges: PhaseReport,
    pub results: Vec<QueryResult>,
    pub started_at: Instant,
}

/// Drives telemetry seeding, edge propagation, and the query round
pub struct Harness {
    transport: Arc<dyn NodeTransport>,
    config: DispatchConfig,
}

impl Harness {
    pub fn new(transport: Arc<dyn NodeTransport>, config: DispatchConfig) -> Self {
        Self { transport, config }
    }

    /// Run the full protocol: seed telemetry, Phase A, barrier, Phase B
    pub async fn run(&self, topology: &Topology, expression: &QueryExpr) -> RunReport {
        let started_at = Instant::now();

        let telemetry = self.seed_telemetry(&topology.nodes).await;
        let edges = self.propagate_edges(topology).await;
        // Phase A is fully joined above; only now may queries observe the
        // delivered edges.
        let results = self.run_query_round(topology, expression).await;

        RunReport {
            telemetry,
            edges,
            results,
            started_at,
        }
    }

    /// Deliver each node's generated record to its own endpoint
    pub async fn seed_telemetry(&self, nodes: &[NodeRecord]) -> PhaseReport {
        info!("Seeding telemetry for {} nodes", nodes.len());

        let tasks: Vec<_> = nodes
            .iter()
            .cloned()
            .map(|record| {
                let transport = Arc::clone(&self.transport);
                let timeout = self.config.invoke_timeout;
                async move {
                    let unit = format!("telemetry {}", record.id);
                    let result =
                        invoke(timeout, transport.ingest_telemetry(&record.id, &record)).await;
                    (unit, ack_outcome(result))
                }
            })
            .collect();

        PhaseReport::merge(self.bounded_fan_out(tasks).await)
    }

    /// Phase A: push every topology edge to its target through the source
    pub async fn propagate_edges(&self, topology: &Topology) -> PhaseReport {
        info!("Propagating {} edges", topology.edge_count());

        let tasks: Vec<_> = topology
            .edges
            .iter()
            .cloned()
            .map(|edge| {
                let transport = Arc::clone(&self.transport);
                let timeout = self.config.invoke_timeout;
                async move {
                    let unit =
                        format!("{} -> {} ({})", edge.source, edge.target, edge.edge_type);
                    let result = invoke(timeout, transport.push_edge(&edge.source, &edge)).await;
                    (unit, ack_outcome(result))
                }
            })
            .collect();

        PhaseReport::merge(self.bounded_fan_out(tasks).await)
    }

    /// Phase B: one query per ordered pair of distinct nodes
    ///
    /// Every pair is attempted exactly once; failures become error results,
    /// never skips.
    pub async fn run_query_round(
        &self,
        topology: &Topology,
        expression: &QueryExpr,
    ) -> Vec<QueryResult> {
        let pairs: Vec<(String, String)> = topology
            .node_ids()
            .flat_map(|src| {
                topology
                    .node_ids()
                    .filter(move |dst| *dst != src)
                    .map(move |dst| (src.to_string(), dst.to_string()))
            })
            .collect();

        info!(
            "Running query round over {} pairs: {}",
            pairs.len(),
            expression
        );

        let tasks: Vec<_> = pairs
            .into_iter()
            .map(|(source, target)| {
                let transport = Arc::clone(&self.transport);
                let timeout = self.config.invoke_timeout;
                let expression = expression.clone();
                async move {
                    let started = Instant::now();
                    let result =
                        invoke(timeout, transport.query(&source, &target, &expression)).await;
                    let latency = started.elapsed();

                    let outcome = match result {
                        Ok(response) if response.status == Status::Success => {
                            debug!(
                                "[QUERY] {} -> {}: {} rows in {:?}",
                                source,
                                target,
                                response.rows.len(),
                                latency
                            );
                            QueryOutcome::Success {
                                rows: response.rows,
                            }
                        }
                        Ok(response) => {
                            let message = response
                                .message
                                .unwrap_or_else(|| "unspecified node error".to_string());
                            warn!("[QUERY] {} -> {}: {}", source, target, message);
                            QueryOutcome::Error { message }
                        }
                        Err(error) => {
                            warn!("[QUERY] {} -> {}: {}", source, target, error);
                            QueryOutcome::Error {
                                message: error.to_string(),
                            }
                        }
                    };

                    QueryResult {
                        source,
                        target,
                        latency,
                        outcome,
                    }
                }
            })
            .collect();

        self.bounded_fan_out(tasks).await
    }

    /// Spawn tasks with at most `max_in_flight` running at once, merging
    /// per-task result slots after the join
    async fn bounded_fan_out<F, T>(&self, tasks: Vec<F>) -> Vec<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let max_in_flight = self.config.max_in_flight.max(1);
        let mut merged = Vec::with_capacity(tasks.len());
        let mut in_flight = JoinSet::new();

        for task in tasks {
            while in_flight.len() >= max_in_flight {
                match in_flight.join_next().await {
                    Some(Ok(slot)) => merged.push(slot),
                    Some(Err(e)) => warn!("Dispatch task panicked: {}", e),
                    None => break,
                }
            }
            in_flight.spawn(task);
        }

        while let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok(slot) => merged.push(slot),
                Err(e) => warn!("Dispatch task panicked: {}", e),
            }
        }

        merged
    }
}

/// Bound a transport invocation with the configured timeout
async fn invoke<T>(
    timeout: Duration,
    fut: impl Future<Output = Result<T, TransportError>>,
) -> Result<T, TransportError> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(timeout)),
    }
}

fn ack_outcome(result: Result<sensegrid_core::Ack, TransportError>) -> Result<(), String> {
    match result {
        Ok(ack) if ack.is_success() => Ok(()),
        Ok(ack) => Err(ack.message),
        Err(error) => Err(error.to_string()),
    }
}
