use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use atc_network::config::{ControllerConfig, DEFAULT_PORT, NodeConfig};
use atc_network::loader::parser::load_network;
use atc_network::{logger, run_airport_node, run_controller};

/// Air traffic control network: a controller routing SCHEDULE, PLANE_STATUS and TIME_STATUS
/// requests to one airport node process per airport.
#[derive(Parser)]
#[command(name = "atc", version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// Number of airports to create.
    #[arg(short = 'n', long = "airports", value_name = "N")]
    airports: Option<usize>,

    /// Port number to use for the controller. Airport k listens on PORT + 1 + k.
    #[arg(short, long, value_name = "P")]
    port: Option<u16>,

    /// JSON network file, used instead of -n and the gate count list.
    #[arg(short, long, value_name = "FILE", conflicts_with = "airports")]
    config: Option<PathBuf>,

    /// Gate count of each airport, as separate values or one comma separated list.
    #[arg(value_name = "GATE_COUNTS")]
    gate_counts: Vec<String>,
}

#[derive(Subcommand)]
enum Mode {
    /// Runs a single airport node. Started by the controller.
    #[command(hide = true)]
    Node {
        #[arg(long)]
        id: usize,
        #[arg(long)]
        gates: usize,
        #[arg(long)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.mode {
        Some(Mode::Node { id, gates, port }) => {
            logger::init(&format!("airport-{}", id));
            let config = NodeConfig::new(id, gates, port)?;
            run_until_interrupted(run_airport_node(config)).await.with_context(|| format!("airport node {} failed", id))
        }
        None => {
            logger::init("controller");
            let config = match cli.config {
                Some(path) => ControllerConfig::from_dto(load_network(&path)?, cli.port)?,
                None => ControllerConfig::from_args(cli.airports.unwrap_or(0), cli.port.unwrap_or(DEFAULT_PORT), &cli.gate_counts)?,
            };
            run_until_interrupted(run_controller(config)).await.context("controller failed")
        }
    }
}

async fn run_until_interrupted(server: impl Future<Output = atc_network::error::Result<()>>) -> anyhow::Result<()> {
    tokio::select! {
        result = server => Ok(result?),
        _ = tokio::signal::ctrl_c() => {
            log::info!("Interrupted, shutting down.");
            Ok(())
        }
    }
}
