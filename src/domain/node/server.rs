use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;

use crate::config::{NUM_TIME_SLOTS, QUEUE_CAPACITY, WORKER_COUNT};
use crate::domain::airport::airport::Airport;
use crate::domain::communication::codec::{Frame, LineCodec};
use crate::domain::communication::protocol::{Request, RequestError, Response};
use crate::domain::node::connection_queue::ConnectionQueue;
use crate::domain::node::worker_pool::WorkerPool;
use crate::error::Result;

/// What to do with a connection once the replies to a line are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    ReadLine,
    Close,
}

/// An airport node: one acceptor feeding a bounded queue drained by a fixed worker pool, all
/// sharing the airport's gates.
pub struct AirportNode {
    airport: Arc<Airport>,
    queue_capacity: usize,
    workers: usize,
}

impl AirportNode {
    pub fn new(airport: Airport) -> Self {
        Self::with_limits(airport, QUEUE_CAPACITY, WORKER_COUNT)
    }

    pub fn with_limits(airport: Airport, queue_capacity: usize, workers: usize) -> Self {
        AirportNode { airport: Arc::new(airport), queue_capacity, workers }
    }

    /// Runs the accept loop on `listener`. Only returns if the worker pool goes away.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let airport_id = self.airport.id();
        let queue: ConnectionQueue<TcpStream> = ConnectionQueue::new(self.queue_capacity);

        let airport = self.airport.clone();
        let pool = WorkerPool::spawn(self.workers, queue.clone(), move |stream: TcpStream| {
            let airport = airport.clone();
            async move {
                if let Err(e) = handle_connection(&airport, stream).await {
                    log::warn!("[Airport {}] Connection ended with error: {}", airport.id(), e);
                }
            }
        });

        log::info!(
            "[Airport {}] Serving {} gates on {} with {} workers.",
            airport_id,
            self.airport.num_gates(),
            listener.local_addr()?,
            pool.size()
        );

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    log::error!("[Airport {}] Accept error: {}", airport_id, e);
                    continue;
                }
            };
            log::debug!("[Airport {}] Accepted connection from {}.", airport_id, peer);

            if queue.enqueue(stream).await.is_err() {
                log::error!("[Airport {}] Worker pool is gone, stopping acceptor.", airport_id);
                return Ok(());
            }
        }
    }
}

/// Runs the request protocol on one connection until the peer closes it or a line asks to
/// close it.
pub async fn handle_connection(airport: &Airport, stream: TcpStream) -> Result<()> {
    let mut framed = Framed::new(stream, LineCodec::new());

    while let Some(frame) = framed.next().await {
        let (responses, next) = match frame? {
            Frame::Line(line) => handle_request(airport, &line),
            Frame::Unreadable => (vec![Response::Error(RequestError::InvalidRequest)], Next::Close),
        };

        for response in responses {
            framed.feed(response.to_string()).await?;
        }
        framed.flush().await?;

        if next == Next::Close {
            break;
        }
    }
    Ok(())
}

/// Dispatches one request line against `airport`.
///
/// # Returns
/// The reply lines, in order, and whether the connection stays open.
pub fn handle_request(airport: &Airport, line: &str) -> (Vec<Response>, Next) {
    let request = match Request::parse(line) {
        Ok(request) => request,
        Err(RequestError::InvalidRequest) => {
            log::debug!("[Airport {}] Invalid request {:?}.", airport.id(), line);
            return (vec![Response::Error(RequestError::InvalidRequest)], Next::Close);
        }
        Err(e) => return (vec![Response::Error(e)], Next::ReadLine),
    };

    if request.airport() != airport.id() as i64 {
        log::warn!("[Airport {}] Serving request addressed to airport {}.", airport.id(), request.airport());
    }

    let responses = match request {
        Request::Schedule { plane_id, earliest, duration, fuel, .. } => vec![schedule(airport, plane_id, earliest, duration, fuel)],
        Request::PlaneStatus { plane_id, .. } => vec![plane_status(airport, plane_id)],
        Request::TimeStatus { gate, start, duration, .. } => time_status(airport, gate, start, duration),
    };
    (responses, Next::ReadLine)
}

fn schedule(airport: &Airport, plane_id: i64, earliest: i64, duration: i64, fuel: i64) -> Response {
    let Some(earliest_slot) = usize::try_from(earliest).ok().filter(|&e| e < NUM_TIME_SLOTS) else {
        return RequestError::InvalidEarliest(earliest).into();
    };
    let Some(duration_slots) = usize::try_from(duration).ok().filter(|&d| earliest_slot + d <= NUM_TIME_SLOTS) else {
        return RequestError::InvalidDuration(duration).into();
    };
    let Ok(fuel_slots) = usize::try_from(fuel) else {
        return RequestError::InvalidFuel(fuel).into();
    };

    match airport.schedule_plane(plane_id, earliest_slot, duration_slots, fuel_slots) {
        Some(result) => Response::Scheduled { plane_id, result },
        None => Response::CannotSchedule { plane_id },
    }
}

fn plane_status(airport: &Airport, plane_id: i64) -> Response {
    match airport.find_plane(plane_id) {
        Some(result) => Response::PlaneFound { plane_id, result },
        None => Response::PlaneNotScheduled { plane_id, airport: airport.id() },
    }
}

fn time_status(airport: &Airport, gate: i64, start: i64, duration: i64) -> Vec<Response> {
    match airport.dump_range(gate, start, duration) {
        // dump_range only succeeds for a valid, non-negative gate.
        Ok(statuses) => statuses.into_iter().map(|status| Response::Slot { airport: airport.id(), gate: gate as usize, status }).collect(),
        Err(e) => vec![e.into()],
    }
}
