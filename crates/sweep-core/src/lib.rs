mod config;
mod entry;
mod error;
mod task;

pub use config::EngineConfig;
pub use entry::{matching_tasks, DirEntryInfo};
pub use error::{CombinedFailure, FailureReason, Result, SweepError, TerminalError};
pub use task::DeletionTask;

/// Extension targeted when no configuration says otherwise
pub const DEFAULT_EXTENSION: &str = ".rdp";
