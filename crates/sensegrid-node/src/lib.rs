//! SenseGrid Node - Per-node telemetry service
//!
//! Implements the remote node endpoint contract consumed by the dispatch
//! harness: ingest telemetry, ingest edge, run query, health check — plus
//! the relay surface through which a node is instructed to contact a peer.
//!
//! Storage is an append-only in-memory store; query expressions are
//! structured predicates evaluated with parameter binding, never
//! interpolated into query text.

pub mod error;
pub mod handlers;
pub mod query;
pub mod router;
pub mod store;

pub use error::{ApiError, Result};
pub use handlers::AppState;
pub use router::create_router;
pub use store::{NodeStore, StoredEdge, StoredRecord};
