//! SenseGrid Core - Types and policy for the sensor network simulator
//!
//! This crate provides the pure (no I/O, no async) heart of SenseGrid:
//! - `FieldSchema`: declarative per-node telemetry schemas + the synthetic
//!   data generator
//! - `NodeRecord`, `Edge`, `Topology`: the simulated network snapshot
//! - `rules_for`: the static edge-rule table mapping node type to outgoing
//!   edge specifications
//! - `build_topology`: graph assembly from node records + the rule table
//! - The wire contract (`Ack`, `QueryExpr`, `QueryResponse`) shared by the
//!   node service and the dispatch harness

pub mod error;
pub mod protocol;
pub mod rules;
pub mod schema;
pub mod topology;
pub mod types;

pub use error::{Result, SchemaError};
pub use protocol::{
    Ack, QueryExpr, QueryOp, QueryRequest, QueryResponse, RelayEdgeRequest, RelayQueryRequest,
    Status,
};
pub use rules::rules_for;
pub use schema::{generate_fields, FieldSchema, FieldSpec};
pub use topology::build_topology;
pub use types::{Edge, EdgeSpec, FieldValue, NodeId, NodeRecord, NodeType, OneOrMany, Topology};
