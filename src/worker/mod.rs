//! Worker Lambda handler and the archive workflow

pub mod archive;
pub mod handler;
pub mod relay;

// Re-export the main handler for convenience
pub use handler::{WorkerContext, handler};
