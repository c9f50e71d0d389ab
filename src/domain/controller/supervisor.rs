use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::{Instant, sleep};

use crate::config::ControllerConfig;
use crate::domain::controller::directory::{AirportDirectory, AirportEntry};
use crate::error::{Error, Result};

/// How long a freshly spawned node gets to start accepting connections.
pub const NODE_STARTUP_TIMEOUT: Duration = Duration::from_secs(5);
const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Spawns one airport node process per configured airport and reaps them when they exit.
pub struct Supervisor {
    executable: PathBuf,
}

impl Supervisor {
    /// Supervisor that launches nodes by re-running the current executable in `node` mode.
    pub fn current_exe() -> Result<Self> {
        Ok(Supervisor { executable: std::env::current_exe()? })
    }

    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Supervisor { executable: executable.into() }
    }

    /// Starts every airport of `config` and waits for each to accept connections.
    ///
    /// A node that cannot be spawned aborts startup. A node that never becomes ready is only
    /// logged; requests for it are answered with a connection error.
    pub async fn launch(&self, config: &ControllerConfig) -> Result<AirportDirectory> {
        let mut entries = Vec::with_capacity(config.num_airports());

        for (id, &gates) in config.gate_counts.iter().enumerate() {
            let address = config.airport_addr(id);
            let child = self.spawn_node(id, gates, address)?;
            let pid = child.id();
            log::info!("[Controller] Airport {} assigned port {} (pid {:?}).", id, address.port(), pid);

            tokio::spawn(reap(id, child));
            entries.push(AirportEntry { id, address, pid });
        }

        for entry in &entries {
            if !wait_until_ready(entry.address, NODE_STARTUP_TIMEOUT).await {
                log::error!("[Controller] Airport {} did not come up on {}.", entry.id, entry.address);
            }
        }

        Ok(AirportDirectory::new(entries))
    }

    fn spawn_node(&self, id: usize, gates: usize, address: SocketAddr) -> Result<Child> {
        Command::new(&self.executable)
            .arg("node")
            .args(["--id", &id.to_string()])
            .args(["--gates", &gates.to_string()])
            .args(["--port", &address.port().to_string()])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::NodeStartupError { airport: id, reason: e.to_string() })
    }
}

/// Awaits the node's exit so it never lingers as a zombie.
async fn reap(id: usize, mut child: Child) {
    match child.wait().await {
        Ok(status) if status.success() => log::info!("[Controller] Airport {} exited.", id),
        Ok(status) => log::warn!("[Controller] Airport {} exited with {}.", id, status),
        Err(e) => log::error!("[Controller] Failed to wait for airport {}: {}", id, e),
    }
}

/// Polls `address` until it accepts a TCP connection or `timeout` passes.
pub async fn wait_until_ready(address: SocketAddr, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if TcpStream::connect(address).await.is_ok() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(READY_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_ready_once_listening() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        assert!(wait_until_ready(address, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_not_ready_when_nothing_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        assert!(!wait_until_ready(address, Duration::from_millis(200)).await);
    }

    #[tokio::test]
    async fn test_missing_executable_aborts_launch() {
        let supervisor = Supervisor::with_executable("/nonexistent/atc-binary");
        let config = ControllerConfig::new(20000, vec![1]).unwrap();
        assert!(matches!(supervisor.launch(&config).await, Err(Error::NodeStartupError { airport: 0, .. })));
    }
}
