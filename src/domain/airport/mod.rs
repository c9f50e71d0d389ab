pub mod airport;
pub mod gate;
pub mod slot;
