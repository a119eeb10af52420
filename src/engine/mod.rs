//! Storage engines implementing the `api::Engine` boundary.

pub mod disk;
pub mod mem;

pub use disk::DiskEngine;
pub use mem::MemEngine;
