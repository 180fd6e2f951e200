//! SenseGrid Dispatch - Fan-out/fan-in protocol driver
//!
//! This crate drives the distributed half of a simulation run:
//! - `NodeTransport`: the abstract invoke capability against remote node
//!   endpoints, with an HTTP relay implementation
//! - `EndpointMap`: node id → endpoint registry; a topology node without an
//!   endpoint is fatal before dispatch begins
//! - `Harness`: telemetry seeding, Phase A edge propagation, and the
//!   Phase B query round with per-pair latency measurement
//! - `summarize`: aggregation of query results into a run summary
//!
//! Transport failures are node-local: they degrade a single unit of work to
//! an error outcome and never abort the run.

pub mod endpoint;
pub mod error;
pub mod harness;
pub mod resource;
pub mod summary;
pub mod transport;

pub use endpoint::{Endpoint, EndpointMap};
pub use error::{DispatchError, Result, TransportError};
pub use harness::{DispatchConfig, Harness, PhaseFailure, PhaseReport, RunReport};
pub use resource::{ResourceProbe, ResourceSnapshot};
pub use summary::{summarize, LatencyStats, QueryOutcome, QueryResult, Summary};
pub use transport::{HttpRelayTransport, NodeTransport};
