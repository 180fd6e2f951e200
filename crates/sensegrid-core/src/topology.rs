//! Topology assembly from node records and the edge-rule table
//!
//! For every ordered pair of distinct nodes, the source's rule specs each
//! produce one edge carrying the source's values for the named fields.
//! Deterministic given the node set; no randomness at this layer.

use crate::rules::rules_for;
use crate::types::{Edge, FieldValue, NodeRecord, Topology};
use chrono::Utc;
use indexmap::IndexMap;

/// Build the complete directed graph over a set of node records
///
/// Edge ordering is grouped by source in node iteration order, then by
/// target, then by spec order. Fields named by a spec but absent from the
/// source record resolve to `FieldValue::Null`, not an error.
pub fn build_topology(nodes: Vec<NodeRecord>) -> Topology {
    let mut edges = Vec::new();

    for src in &nodes {
        let specs = rules_for(src.node_type);
        for dst in &nodes {
            if src.id == dst.id {
                continue;
            }
            for spec in &specs {
                let data_fields: IndexMap<String, FieldValue> = spec
                    .data_fields
                    .iter()
                    .map(|name| {
                        let value = src.field(name).cloned().unwrap_or(FieldValue::Null);
                        (name.clone(), value)
                    })
                    .collect();

                edges.push(Edge {
                    source: src.id.clone(),
                    target: dst.id.clone(),
                    edge_type: spec.edge_type.clone(),
                    data_fields,
                });
            }
        }
    }

    Topology {
        nodes,
        edges,
        generated_at: Utc::now(),
    }
}
