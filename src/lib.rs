use tokio::net::TcpListener;

use crate::config::{ControllerConfig, NodeConfig};
use crate::domain::airport::airport::Airport;
use crate::domain::controller::router::ControllerRouter;
use crate::domain::controller::supervisor::Supervisor;
use crate::domain::node::server::AirportNode;
use crate::error::Result;

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Runs the controller: binds its port, starts one airport node process per airport, then
/// routes client requests until the process is stopped.
pub async fn run_controller(config: ControllerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.controller_addr()).await?;
    log::info!("Controller bound to {}. Starting {} airport nodes.", config.controller_addr(), config.num_airports());

    let directory = Supervisor::current_exe()?.launch(&config).await?;

    ControllerRouter::new(directory).serve(listener).await
}

/// Runs one airport node process until it is stopped.
pub async fn run_airport_node(config: NodeConfig) -> Result<()> {
    let airport = Airport::new(config.airport_id, config.num_gates)?;
    let listener = TcpListener::bind(config.addr()).await?;

    AirportNode::new(airport).serve(listener).await
}
