pub mod cli;
pub mod config;
pub mod engine;
pub mod program;
pub mod types;

// Re-export main types
pub use engine::{ExecutionEngine, RunHandle, RunOutcome, Snapshot, StartOutcome};
pub use program::Program;
pub use types::*;
