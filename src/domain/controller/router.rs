use futures::{Sink, SinkExt, StreamExt};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::domain::communication::codec::{Frame, LineCodec};
use crate::domain::communication::protocol::{Request, RequestError};
use crate::domain::controller::directory::{AirportDirectory, AirportEntry};
use crate::error::{Error, Result};

/// Front door of the network: reads client requests and relays each one to the airport node it
/// names, over a fresh connection per request.
#[derive(Debug, Clone)]
pub struct ControllerRouter {
    directory: Arc<AirportDirectory>,
}

impl ControllerRouter {
    pub fn new(directory: AirportDirectory) -> Self {
        ControllerRouter { directory: Arc::new(directory) }
    }

    /// Accept loop. Every client connection gets its own task.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        log::info!("[Controller] Listening on {} for {} airports.", listener.local_addr()?, self.directory.len());

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    log::error!("[Controller] Accept error: {}", e);
                    continue;
                }
            };
            log::debug!("[Controller] Client {} connected.", peer);

            let router = self.clone();
            tokio::spawn(async move {
                if let Err(e) = router.handle_client(stream).await {
                    log::warn!("[Controller] Client {} dropped: {}", peer, e);
                }
            });
        }
    }

    /// Serves one client until it closes its end. Each request is answered in full before the
    /// next line is read.
    pub async fn handle_client(&self, stream: TcpStream) -> Result<()> {
        let (read_half, write_half) = stream.into_split();
        let mut requests = FramedRead::new(read_half, LineCodec::new());
        let mut client = FramedWrite::new(write_half, LineCodec::new());

        while let Some(frame) = requests.next().await {
            match frame? {
                Frame::Line(line) => self.route(&line, &mut client).await?,
                Frame::Unreadable => client.send(RequestError::InvalidRequest.to_string()).await?,
            }
        }
        Ok(())
    }

    /// Checks the shape of one request line and relays it to its airport.
    ///
    /// Field ranges are left to the airport node. Every rejection here is a single error line to
    /// the client; none of them closes the client connection.
    pub async fn route<S>(&self, line: &str, client: &mut S) -> Result<()>
    where
        S: Sink<String, Error = Error> + Unpin,
    {
        let request = match Request::parse(line) {
            Ok(request) => request,
            Err(_) => return client.send(RequestError::InvalidRequest.to_string()).await,
        };

        let Some(entry) = self.directory.resolve(request.airport()) else {
            return client.send(RequestError::UnknownAirport(request.airport()).to_string()).await;
        };

        log::debug!("[Controller] Routing {} to airport {} at {}.", request.command(), entry.id, entry.address);
        self.forward(entry, line, client).await
    }

    /// Relays `line` verbatim to `entry` and streams every reply line back until the node
    /// closes its end.
    ///
    /// A node that cannot be written to, or that closes without answering, is reported to the
    /// client as unreachable.
    async fn forward<S>(&self, entry: &AirportEntry, line: &str, client: &mut S) -> Result<()>
    where
        S: Sink<String, Error = Error> + Unpin,
    {
        let backend = match TcpStream::connect(entry.address).await {
            Ok(backend) => backend,
            Err(e) => {
                log::warn!("[Controller] Failed to connect to airport {} at {}: {}", entry.id, entry.address, e);
                return client.send(RequestError::AirportUnreachable(entry.id).to_string()).await;
            }
        };

        let (read_half, write_half) = backend.into_split();
        if let Err(e) = send_request(write_half, line).await {
            log::warn!("[Controller] Failed to send request to airport {}: {}", entry.id, e);
            return client.send(RequestError::AirportUnreachable(entry.id).to_string()).await;
        }

        let mut replies = FramedRead::new(read_half, LineCodec::new());
        let mut relayed = 0;
        while let Some(reply) = replies.next().await {
            match reply {
                Ok(Frame::Line(reply)) => {
                    client.send(reply).await?;
                    relayed += 1;
                }
                Ok(Frame::Unreadable) => log::warn!("[Controller] Dropped an unreadable reply line from airport {}.", entry.id),
                Err(e) => {
                    log::warn!("[Controller] Reply stream from airport {} broke off: {}", entry.id, e);
                    break;
                }
            }
        }

        if relayed == 0 {
            log::warn!("[Controller] Airport {} closed without answering.", entry.id);
            return client.send(RequestError::AirportUnreachable(entry.id).to_string()).await;
        }
        Ok(())
    }
}

/// Writes one request line and half-closes, so the node sees EOF once it has answered.
async fn send_request(write_half: OwnedWriteHalf, line: &str) -> Result<()> {
    let mut to_airport = FramedWrite::new(write_half, LineCodec::new());
    to_airport.send(line.to_string()).await?;
    to_airport.into_inner().shutdown().await?;
    Ok(())
}
