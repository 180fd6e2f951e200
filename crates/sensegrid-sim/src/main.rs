//! CLI entry point for the SenseGrid simulator

use anyhow::Result;
use clap::{Parser, Subcommand};
use sensegrid_core::QueryExpr;
use sensegrid_sim::{build_topology_from_config, run_simulation, SimConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sensegrid-sim")]
#[command(about = "Distributed sensor network simulator and measurement harness")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: generate, dispatch, measure, report
    Run {
        /// Path to the simulation config (TOML)
        #[arg(short, long, default_value = "sensegrid.toml")]
        config: PathBuf,

        /// Query applied to every node pair, e.g. "emergency_cars eq true"
        #[arg(short, long, default_value = "emergency_cars eq true")]
        query: QueryExpr,

        /// RNG seed override for reproducible generation
        #[arg(short, long)]
        seed: Option<u64>,

        /// Where to write the topology export
        #[arg(short, long, default_value = "topology.json")]
        topology_out: PathBuf,

        /// Output file for the report (markdown)
        #[arg(short, long)]
        output: Option<String>,

        /// Also output JSON report
        #[arg(long)]
        json: bool,
    },

    /// Build and export the topology without dispatching anything
    Topology {
        /// Path to the simulation config (TOML)
        #[arg(short, long, default_value = "sensegrid.toml")]
        config: PathBuf,

        /// RNG seed override for reproducible generation
        #[arg(short, long)]
        seed: Option<u64>,

        /// Where to write the topology export
        #[arg(short, long, default_value = "topology.json")]
        topology_out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            query,
            seed,
            topology_out,
            output,
            json,
        } => {
            let config = SimConfig::from_file(&config)?;
            info!(
                "Starting simulation: {} nodes, query '{}'",
                config.nodes.len(),
                query
            );

            let outcome = run_simulation(&config, &query, seed).await?;

            export_topology(&outcome.topology, &topology_out)?;
            outcome.report.print_summary();

            if let Some(output_path) = output {
                let md_path = if output_path.ends_with(".md") {
                    output_path
                } else {
                    format!("{}.md", output_path)
                };

                std::fs::write(&md_path, outcome.report.to_markdown())?;
                info!("Markdown report saved to: {}", md_path);

                if json {
                    let json_path = md_path.replace(".md", ".json");
                    std::fs::write(&json_path, outcome.report.to_json())?;
                    info!("JSON report saved to: {}", json_path);
                }
            }
        }

        Commands::Topology {
            config,
            seed,
            topology_out,
        } => {
            let config = SimConfig::from_file(&config)?;
            let topology = build_topology_from_config(&config, seed)?;
            export_topology(&topology, &topology_out)?;
        }
    }

    Ok(())
}

/// Write the topology export consumed by visualization collaborators
fn export_topology(topology: &sensegrid_core::Topology, path: &std::path::Path) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(topology)?)?;
    info!(
        "Topology export ({} nodes, {} edges) saved to: {}",
        topology.node_count(),
        topology.edge_count(),
        path.display()
    );
    Ok(())
}
