//! In-memory node storage
//!
//! The original deployment persisted rows in a relational engine; that
//! mechanism is out of scope here, so the node keeps its telemetry and
//! edges in append-only vectors with arrival stamps.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sensegrid_core::{Edge, NodeRecord};
use std::time::Instant;

/// A telemetry record with its arrival stamp
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub received_at: DateTime<Utc>,
    pub record: NodeRecord,
}

/// An ingested edge with its arrival stamp
#[derive(Debug, Clone)]
pub struct StoredEdge {
    pub received_at: DateTime<Utc>,
    pub edge: Edge,
}

/// Append-only store for one node
pub struct NodeStore {
    node_id: String,
    started: Instant,
    telemetry: RwLock<Vec<StoredRecord>>,
    edges: RwLock<Vec<StoredEdge>>,
}

impl NodeStore {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            started: Instant::now(),
            telemetry: RwLock::new(Vec::new()),
            edges: RwLock::new(Vec::new()),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    pub fn insert_telemetry(&self, record: NodeRecord) {
        self.telemetry.write().push(StoredRecord {
            received_at: Utc::now(),
            record,
        });
    }

    pub fn insert_edge(&self, edge: Edge) {
        self.edges.write().push(StoredEdge {
            received_at: Utc::now(),
            edge,
        });
    }

    pub fn telemetry_count(&self) -> usize {
        self.telemetry.read().len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.read().len()
    }

    /// Snapshot of all stored telemetry
    pub fn telemetry(&self) -> Vec<StoredRecord> {
        self.telemetry.read().clone()
    }
}
