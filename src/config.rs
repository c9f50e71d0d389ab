use std::net::{Ipv4Addr, SocketAddr};

use crate::api::network_dto::NetworkDto;
use crate::error::{Error, Result};

/// Number of slots in every gate's timeline.
pub const NUM_TIME_SLOTS: usize = 96;
/// Width of one slot in minutes.
pub const SLOT_MINUTES: usize = 15;

/// Pending connections an airport node buffers before its acceptor blocks.
pub const QUEUE_CAPACITY: usize = 16;
/// Long-lived workers per airport node.
pub const WORKER_COUNT: usize = 4;

/// Longest request or response line accepted on the wire, terminator included.
pub const MAX_LINE: usize = 8192;

pub const DEFAULT_PORT: u16 = 1024;
pub const MIN_PORT: u16 = 1024;
pub const MAX_PORT: u16 = 65535;

/// Host every process of the network binds to and dials.
pub const LOOPBACK: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Validated settings of the controller process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub port: u16,
    pub gate_counts: Vec<usize>,
}

impl ControllerConfig {
    pub fn new(port: u16, gate_counts: Vec<usize>) -> Result<Self> {
        if gate_counts.is_empty() {
            return Err(Error::ConfigError("-n must be greater than 0.".to_string()));
        }

        // Every airport takes the next port after the controller's.
        let max_port = MAX_PORT as usize - gate_counts.len();
        if (port as usize) < MIN_PORT as usize || port as usize >= max_port {
            return Err(Error::ConfigError(format!("-p must be between {}-{}.", MIN_PORT, max_port)));
        }

        if let Some(airport) = gate_counts.iter().position(|&gates| gates == 0) {
            return Err(Error::ConfigError(format!("Airport {} must have at least one gate.", airport)));
        }

        Ok(Self { port, gate_counts })
    }

    /// Builds the configuration from the `-n` count and the raw positional gate count arguments.
    pub fn from_args(num_airports: usize, port: u16, raw_gate_counts: &[String]) -> Result<Self> {
        if num_airports == 0 {
            return Err(Error::ConfigError("-n must be greater than 0.".to_string()));
        }
        let gate_counts = parse_gate_counts(raw_gate_counts, num_airports)?;
        Self::new(port, gate_counts)
    }

    pub fn from_dto(dto: NetworkDto, port_override: Option<u16>) -> Result<Self> {
        let port = port_override.or(dto.port).unwrap_or(DEFAULT_PORT);
        Self::new(port, dto.airports.into_iter().map(|a| a.gates).collect())
    }

    pub fn num_airports(&self) -> usize {
        self.gate_counts.len()
    }

    pub fn controller_addr(&self) -> SocketAddr {
        SocketAddr::from((LOOPBACK, self.port))
    }

    /// Address of airport node `airport`: ports are handed out sequentially after the controller's.
    pub fn airport_addr(&self, airport: usize) -> SocketAddr {
        SocketAddr::from((LOOPBACK, self.port + 1 + airport as u16))
    }
}

/// Settings handed to a spawned airport node process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeConfig {
    pub airport_id: usize,
    pub num_gates: usize,
    pub port: u16,
}

impl NodeConfig {
    pub fn new(airport_id: usize, num_gates: usize, port: u16) -> Result<Self> {
        if num_gates == 0 {
            return Err(Error::ConfigError(format!("Airport {} must have at least one gate.", airport_id)));
        }
        Ok(Self { airport_id, num_gates, port })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from((LOOPBACK, self.port))
    }
}

/// Reads `expected` gate counts from the positional arguments.
///
/// Each argument may carry a single count or a list separated by commas or whitespace, so both
/// `atc -n 3 2 4 1` and `atc -n 3 -- "2,4,1"` work. Counts beyond `expected` are ignored.
pub fn parse_gate_counts(raw: &[String], expected: usize) -> Result<Vec<usize>> {
    let mut counts = Vec::with_capacity(expected);

    for token in raw.iter().flat_map(|arg| arg.split(|c: char| c == ',' || c.is_whitespace())).filter(|t| !t.is_empty()) {
        let count = token.parse::<usize>().map_err(|_| Error::ConfigError(format!("Invalid gate count '{}'.", token)))?;
        counts.push(count);
    }

    if counts.len() < expected {
        return Err(Error::ConfigError(format!("Expected {} gate counts, got {} instead.", expected, counts.len())));
    }

    if counts.len() > expected {
        log::warn!("Ignoring {} gate counts beyond the expected {}.", counts.len() - expected, expected);
        counts.truncate(expected);
    }

    Ok(counts)
}
