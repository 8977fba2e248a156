use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Why a file ended up undeleted
#[derive(Error, Debug)]
pub enum FailureReason {
    #[error("timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("delete failed: {0}")]
    DeleteFailed(#[source] io::Error),

    #[error("delete attempt panicked: {0}")]
    Panicked(String),

    #[error("cancelled before the file could be deleted")]
    Cancelled,
}

impl FailureReason {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FailureReason::Timeout { .. })
    }
}

/// A file whose retries are exhausted. Exactly one is produced per such file.
#[derive(Error, Debug)]
#[error("{} ({reason}, {retries_exhausted} retries)", .file_path.display())]
pub struct TerminalError {
    pub file_path: PathBuf,
    #[source]
    pub reason: FailureReason,
    pub retries_exhausted: u32,
}

/// Every terminal error of a run, in arrival order
#[derive(Error, Debug, Default)]
#[error("errors occurred during file deletion ({} files): {}", .failures.len(), join_failures(.failures))]
pub struct CombinedFailure {
    pub failures: Vec<TerminalError>,
}

impl CombinedFailure {
    pub fn new(failures: Vec<TerminalError>) -> Self {
        CombinedFailure { failures }
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TerminalError> {
        self.failures.iter()
    }
}

fn join_failures(failures: &[TerminalError]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum SweepError {
    #[error(transparent)]
    DeletionFailed(#[from] CombinedFailure),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, SweepError>;
