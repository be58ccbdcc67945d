//! Command handlers for the FAQ bot CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod search;
pub mod serve;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use search::SearchCommand;
pub use serve::ServeCommand;
pub use stats::StatsCommand;
