pub mod connection_queue;
pub mod server;
pub mod worker_pool;
