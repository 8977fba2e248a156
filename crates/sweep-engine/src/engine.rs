use crate::collector::{outcome_channel, DeletionReport, TaskOutcome};
use crate::executor::{AttemptExecutor, FileRemover, StdRemover};
use crate::queue::DeletionQueue;
use crate::worker::{task_path, WorkerContext, WorkerPool};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sweep_core::{
    matching_tasks, DirEntryInfo, EngineConfig, FailureReason, Result, SweepError, TerminalError,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Deletes every file of a directory matching the configured extension,
/// using a fixed pool of workers with per-attempt timeouts and bounded retries.
pub struct DeletionEngine {
    config: EngineConfig,
    remover: Arc<dyn FileRemover>,
    cancel: CancellationToken,
}

impl DeletionEngine {
    pub fn new(config: EngineConfig, remover: Arc<dyn FileRemover>) -> Result<Self> {
        config.validate()?;
        Ok(DeletionEngine {
            config,
            remover,
            cancel: CancellationToken::new(),
        })
    }

    /// Engine backed by the real filesystem
    pub fn with_std_remover(config: EngineConfig) -> Result<Self> {
        Self::new(config, Arc::new(StdRemover))
    }

    /// Share an external cancellation token with this engine
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// List `directory` and delete the matching files in it
    pub async fn run_directory(&self, directory: &Path) -> Result<DeletionReport> {
        let entries = list_entries(directory).await?;
        info!("Total files in directory: {}", entries.len());
        self.run(directory, &entries).await
    }

    /// Delete the entries of `directory` matching the configured extension.
    ///
    /// Never fails fast: every matching file reaches a final state before the
    /// result is returned. Any file left behind turns the whole run into
    /// `SweepError::DeletionFailed`.
    pub async fn run(&self, directory: &Path, entries: &[DirEntryInfo]) -> Result<DeletionReport> {
        let tasks = matching_tasks(entries, &self.config.extension);
        let matched = tasks.len();

        if tasks.is_empty() {
            info!(
                "No files ending with {} in {}",
                self.config.extension,
                directory.display()
            );
            return Ok(DeletionReport::default());
        }

        info!(
            "Deleting {} files from {} (workers: {}, max retries: {}, timeout: {:?})",
            matched,
            directory.display(),
            self.config.worker_count,
            self.config.max_retries,
            self.config.attempt_timeout()
        );

        let directory = Arc::new(directory.to_path_buf());
        let queue = Arc::new(DeletionQueue::new());
        let (outcomes, collector) = outcome_channel();

        let ctx = WorkerContext {
            directory: directory.clone(),
            queue: queue.clone(),
            executor: Arc::new(AttemptExecutor::new(
                self.remover.clone(),
                self.config.attempt_timeout(),
                self.cancel.clone(),
            )),
            outcomes: outcomes.clone(),
            max_retries: self.config.max_retries,
            cancel: self.cancel.clone(),
        };
        let pool = WorkerPool::spawn(self.config.worker_count, ctx);

        for task in tasks {
            queue.enqueue(task);
        }
        queue.close();

        pool.join().await;

        // Only non-empty after cancellation
        let leftovers = queue.drain_pending();
        if !leftovers.is_empty() {
            warn!("Run cancelled with {} files still queued", leftovers.len());
        }
        for task in leftovers {
            outcomes.send(TaskOutcome::Failed(TerminalError {
                file_path: task_path(&directory, &task),
                reason: FailureReason::Cancelled,
                retries_exhausted: task.retry_count,
            }));
        }
        drop(outcomes);

        let report = collector.collect(matched).await;
        info!(
            "Run finished: {} deleted, {} already absent, {} failed",
            report.deleted,
            report.already_absent,
            report.failures.len()
        );

        report.into_result().map_err(|combined| {
            error!("{} files could not be deleted", combined.len());
            SweepError::from(combined)
        })
    }
}

/// Read the top level of `directory` into listing entries.
///
/// Names that are not valid UTF-8 are skipped since they can never match an
/// extension filter expressed as a string.
pub async fn list_entries(directory: &Path) -> Result<Vec<DirEntryInfo>> {
    let io_error = |source| SweepError::Io {
        path: directory.to_path_buf(),
        source,
    };

    let mut read_dir = tokio::fs::read_dir(directory).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SweepError::DirectoryNotFound(directory.to_path_buf())
        } else {
            io_error(e)
        }
    })?;

    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await.map_err(io_error)? {
        let file_type = entry.file_type().await.map_err(io_error)?;
        match entry.file_name().into_string() {
            Ok(name) => entries.push(DirEntryInfo {
                name,
                is_dir: file_type.is_dir(),
            }),
            Err(raw) => warn!("Skipping non UTF-8 entry {:?}", PathBuf::from(raw)),
        }
    }

    Ok(entries)
}
