pub mod directory;
pub mod router;
pub mod supervisor;
