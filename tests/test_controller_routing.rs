use atc_network::domain::{
    airport::airport::Airport,
    controller::{directory::AirportDirectory, router::ControllerRouter},
    node::server::AirportNode,
};

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// Stand-in airport node: records the bytes of every connection and answers with fixed lines.
struct RecordingNode {
    address: SocketAddr,
    accepted: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingNode {
    async fn start(id: usize, reply_lines: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(Mutex::new(Vec::new()));

        let (accepted_in, received_in) = (accepted.clone(), received.clone());
        tokio::spawn(async move {
            loop {
                let (mut stream, _) = listener.accept().await.unwrap();
                accepted_in.fetch_add(1, Ordering::SeqCst);

                // Runs until the router half-closes.
                let mut request = Vec::new();
                stream.read_to_end(&mut request).await.unwrap();
                received_in.lock().unwrap().push(request);

                for line in 0..reply_lines {
                    stream.write_all(format!("NODE {} LINE {}\n", id, line).as_bytes()).await.unwrap();
                }
            }
        });

        RecordingNode { address, accepted, received }
    }

    fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    fn received(&self) -> Vec<Vec<u8>> {
        self.received.lock().unwrap().clone()
    }
}

async fn start_controller(directory: AirportDirectory) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(ControllerRouter::new(directory).serve(listener));
    address
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(address: SocketAddr) -> Self {
        let (read_half, writer) = TcpStream::connect(address).await.unwrap().into_split();
        Client { reader: BufReader::new(read_half), writer }
    }

    /// Sends one request and reads back `expected` reply lines.
    async fn request(&mut self, line: &str, expected: usize) -> Vec<String> {
        self.send_bytes(format!("{}\n", line).as_bytes(), expected).await
    }

    async fn send_bytes(&mut self, bytes: &[u8], expected: usize) -> Vec<String> {
        self.writer.write_all(bytes).await.unwrap();

        let mut replies = Vec::new();
        for _ in 0..expected {
            let mut reply = String::new();
            let read = timeout(Duration::from_secs(5), self.reader.read_line(&mut reply)).await.expect("controller reply timed out").unwrap();
            assert!(read > 0, "controller closed the client connection");
            replies.push(reply.trim_end_matches('\n').to_string());
        }
        replies
    }
}

#[tokio::test]
async fn test_request_reaches_only_the_named_airport_byte_for_byte() {
    let nodes = vec![RecordingNode::start(0, 1).await, RecordingNode::start(1, 1).await, RecordingNode::start(2, 1).await];
    let controller = start_controller(AirportDirectory::from_addresses(nodes.iter().map(|n| n.address))).await;

    let mut client = Client::connect(controller).await;
    assert_eq!(client.request("SCHEDULE 1 42 0 4 2", 1).await, vec!["NODE 1 LINE 0"]);

    assert_eq!(nodes[1].received(), vec![b"SCHEDULE 1 42 0 4 2\n".to_vec()]);
    assert_eq!(nodes[0].accepted(), 0);
    assert_eq!(nodes[2].accepted(), 0);
}

#[tokio::test]
async fn test_every_reply_line_is_streamed_back() {
    let node = RecordingNode::start(0, 5).await;
    let controller = start_controller(AirportDirectory::from_addresses([node.address])).await;

    let mut client = Client::connect(controller).await;
    let replies = client.request("TIME_STATUS 0 0 0 5", 5).await;
    assert_eq!(replies, (0..5).map(|i| format!("NODE 0 LINE {}", i)).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_each_request_opens_a_fresh_backend_connection() {
    let node = RecordingNode::start(0, 1).await;
    let controller = start_controller(AirportDirectory::from_addresses([node.address])).await;

    let mut client = Client::connect(controller).await;
    client.request("PLANE_STATUS 0 1", 1).await;
    client.request("PLANE_STATUS 0 2", 1).await;
    client.request("PLANE_STATUS 0 3", 1).await;

    assert_eq!(node.accepted(), 3);
    assert_eq!(node.received()[2], b"PLANE_STATUS 0 3\n".to_vec());
}

#[tokio::test]
async fn test_out_of_range_airport_never_opens_a_connection() {
    let node = RecordingNode::start(0, 1).await;
    let controller = start_controller(AirportDirectory::from_addresses([node.address])).await;

    let mut client = Client::connect(controller).await;
    assert_eq!(client.request("SCHEDULE 1 42 0 4 2", 1).await, vec!["Error: Airport 1 does not exist"]);
    assert_eq!(client.request("PLANE_STATUS -3 42", 1).await, vec!["Error: Airport -3 does not exist"]);

    assert_eq!(node.accepted(), 0);
}

#[tokio::test]
async fn test_malformed_requests_are_answered_locally() {
    let node = RecordingNode::start(0, 1).await;
    let controller = start_controller(AirportDirectory::from_addresses([node.address])).await;

    let mut client = Client::connect(controller).await;
    assert_eq!(client.request("SCHEDULE 0 42 0 4", 1).await, vec!["Error: Invalid request provided"]);
    assert_eq!(client.request("", 1).await, vec!["Error: Invalid request provided"]);
    assert_eq!(client.request("DEPART 0 1", 1).await, vec!["Error: Invalid request provided"]);
    assert_eq!(node.accepted(), 0);

    // Field ranges are the airport's business, so this one is forwarded.
    assert_eq!(client.request("SCHEDULE 0 42 -5 4 2", 1).await, vec!["NODE 0 LINE 0"]);
    assert_eq!(node.accepted(), 1);
}

#[tokio::test]
async fn test_unreachable_airport_is_reported_and_client_stays_connected() {
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_address = dead.local_addr().unwrap();
    drop(dead);
    let live = RecordingNode::start(1, 1).await;

    let controller = start_controller(AirportDirectory::from_addresses([dead_address, live.address])).await;

    let mut client = Client::connect(controller).await;
    assert_eq!(client.request("PLANE_STATUS 0 42", 1).await, vec!["Error: Could not connect to airport 0"]);
    assert_eq!(client.request("PLANE_STATUS 1 42", 1).await, vec!["NODE 1 LINE 0"]);
}

#[tokio::test]
async fn test_unreadable_lines_are_answered_and_client_stays_connected() {
    let node = RecordingNode::start(0, 1).await;
    let controller = start_controller(AirportDirectory::from_addresses([node.address])).await;

    let mut client = Client::connect(controller).await;
    let replies = client.send_bytes(b"SCHEDULE 0 1 0 4 \xff\nPLANE_STATUS 0 9\n", 2).await;
    assert_eq!(replies, vec!["Error: Invalid request provided", "NODE 0 LINE 0"]);

    let mut overlong = vec![b'X'; 9000];
    overlong.extend_from_slice(b"\nPLANE_STATUS 0 8\n");
    let replies = client.send_bytes(&overlong, 2).await;
    assert_eq!(replies, vec!["Error: Invalid request provided", "NODE 0 LINE 0"]);

    // Only the readable requests reached the airport.
    assert_eq!(node.received(), vec![b"PLANE_STATUS 0 9\n".to_vec(), b"PLANE_STATUS 0 8\n".to_vec()]);
}

#[tokio::test]
async fn test_airport_closing_without_reply_is_reported() {
    let silent = RecordingNode::start(0, 0).await;

    // Accepts and drops every connection straight away.
    let hanging_up = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let hanging_up_address = hanging_up.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let (stream, _) = hanging_up.accept().await.unwrap();
            drop(stream);
        }
    });

    let live = RecordingNode::start(2, 1).await;
    let controller = start_controller(AirportDirectory::from_addresses([silent.address, hanging_up_address, live.address])).await;

    let mut client = Client::connect(controller).await;
    assert_eq!(client.request("PLANE_STATUS 0 42", 1).await, vec!["Error: Could not connect to airport 0"]);
    assert_eq!(client.request("PLANE_STATUS 1 42", 1).await, vec!["Error: Could not connect to airport 1"]);
    assert_eq!(client.request("PLANE_STATUS 2 42", 1).await, vec!["NODE 2 LINE 0"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_end_to_end_with_airport_nodes() {
    let mut addresses = Vec::new();
    for (id, gates) in [(0, 1), (1, 2)] {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        addresses.push(listener.local_addr().unwrap());
        tokio::spawn(AirportNode::new(Airport::new(id, gates).unwrap()).serve(listener));
    }
    let controller = start_controller(AirportDirectory::from_addresses(addresses)).await;

    let mut client = Client::connect(controller).await;
    assert_eq!(client.request("SCHEDULE 0 42 0 4 2", 1).await, vec!["SCHEDULED 42 at GATE 0: 00:00-01:00"]);
    assert_eq!(client.request("SCHEDULE 0 7 0 4 2", 1).await, vec!["Error: Cannot schedule 7"]);
    assert_eq!(client.request("SCHEDULE 1 7 0 4 2", 1).await, vec!["SCHEDULED 7 at GATE 0: 00:00-01:00"]);
    assert_eq!(client.request("PLANE_STATUS 1 42", 1).await, vec!["PLANE 42 not scheduled at airport 1"]);
    assert_eq!(client.request("PLANE_STATUS 0 42", 1).await, vec!["PLANE 42 scheduled at GATE 0: 00:00-01:00"]);
    assert_eq!(
        client.request("TIME_STATUS 0 0 3 2", 2).await,
        vec!["AIRPORT 0 GATE 0 00:45: A - 42", "AIRPORT 0 GATE 0 01:00: F - 0"]
    );
    assert_eq!(client.request("TIME_STATUS 1 5 0 1", 1).await, vec!["Error: Invalid 'gate' value (5)"]);
}
