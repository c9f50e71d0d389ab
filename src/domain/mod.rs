pub mod airport;
pub mod communication;
pub mod controller;
pub mod node;
