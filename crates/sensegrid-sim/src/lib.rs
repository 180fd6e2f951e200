//! SenseGrid Simulator - Orchestrates one simulation run
//!
//! Pipeline: load config + schemas → generate per-node telemetry → build
//! the topology → push edges to every node pair → issue cross-node queries
//! → aggregate latencies into a performance report.
//!
//! Node provisioning is an external concern; the simulator starts from a
//! config naming each node's id, endpoint URL, and schema file.
//!
//! # Usage
//! ```bash
//! # Full run against already-provisioned node endpoints
//! sensegrid-sim run --config sensegrid.toml --query "emergency_cars eq true"
//!
//! # Build and export the topology only
//! sensegrid-sim topology --config sensegrid.toml --seed 42
//! ```

pub mod config;
pub mod report;
pub mod runner;

pub use config::{DispatchSettings, HealthSettings, NodeEntry, SimConfig};
pub use report::{PairOutcome, Report};
pub use runner::{build_topology_from_config, run_simulation, SimError, SimulationOutcome};
