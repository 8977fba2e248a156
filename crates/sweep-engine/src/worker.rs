use crate::collector::{OutcomeSender, TaskOutcome};
use crate::executor::{AttemptExecutor, AttemptOutcome};
use crate::queue::DeletionQueue;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sweep_core::{DeletionTask, FailureReason, TerminalError};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// State shared by every worker of one run
#[derive(Clone)]
pub struct WorkerContext {
    pub directory: Arc<PathBuf>,
    pub queue: Arc<DeletionQueue>,
    pub executor: Arc<AttemptExecutor>,
    pub outcomes: OutcomeSender,
    pub max_retries: u32,
    pub cancel: CancellationToken,
}

/// Drains the queue one task at a time
pub struct Worker {
    id: usize,
    ctx: WorkerContext,
}

impl Worker {
    pub fn new(id: usize, ctx: WorkerContext) -> Self {
        Worker { id, ctx }
    }

    pub async fn run(self) {
        debug!("Worker {} started", self.id);

        loop {
            let task = tokio::select! {
                biased;
                _ = self.ctx.cancel.cancelled() => {
                    debug!("Worker {} observed cancellation", self.id);
                    break;
                }
                task = self.ctx.queue.dequeue() => match task {
                    Some(task) => task,
                    None => break,
                },
            };

            self.process(task).await;
        }

        debug!("Worker {} exiting", self.id);
    }

    async fn process(&self, mut task: DeletionTask) {
        let file_path = task_path(&self.ctx.directory, &task);
        let attempts = task.retry_count + 1;

        let reason = match self.ctx.executor.attempt(&file_path).await {
            AttemptOutcome::Deleted => {
                info!("Deleted file: {}", file_path.display());
                self.resolve(TaskOutcome::Deleted { file_path, attempts });
                return;
            }
            AttemptOutcome::AlreadyAbsent => {
                info!("File already absent: {}", file_path.display());
                self.resolve(TaskOutcome::AlreadyAbsent { file_path, attempts });
                return;
            }
            AttemptOutcome::Cancelled => {
                self.fail(file_path, FailureReason::Cancelled, task.retry_count);
                return;
            }
            AttemptOutcome::Failed(e) => FailureReason::DeleteFailed(e),
            AttemptOutcome::Panicked(message) => FailureReason::Panicked(message),
            AttemptOutcome::TimedOut => FailureReason::Timeout {
                timeout: self.ctx.executor.attempt_timeout(),
            },
        };

        if task.can_retry(self.ctx.max_retries) {
            task.retry();
            warn!(
                "Retrying {} ({}/{}): {}",
                file_path.display(),
                task.retry_count,
                self.ctx.max_retries,
                reason
            );
            self.ctx.queue.requeue(task);
        } else {
            self.fail(file_path, reason, task.retry_count);
        }
    }

    fn fail(&self, file_path: PathBuf, reason: FailureReason, retries: u32) {
        let error = TerminalError {
            file_path,
            reason,
            retries_exhausted: retries,
        };
        error!("Giving up on {}", error);
        self.resolve(TaskOutcome::Failed(error));
    }

    fn resolve(&self, outcome: TaskOutcome) {
        // Report before releasing the in-flight slot so the outcome exists
        // by the time the queue can be observed as finished
        self.ctx.outcomes.send(outcome);
        self.ctx.queue.complete();
    }
}

/// Fixed-size set of workers sharing one queue
pub struct WorkerPool {
    workers: JoinSet<()>,
}

impl WorkerPool {
    pub fn spawn(worker_count: usize, ctx: WorkerContext) -> Self {
        let mut workers = JoinSet::new();
        for id in 0..worker_count {
            let worker = Worker::new(id, ctx.clone());
            workers.spawn(worker.run());
        }
        WorkerPool { workers }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Wait until every worker has exited
    pub async fn join(mut self) {
        while let Some(result) = self.workers.join_next().await {
            if let Err(e) = result {
                error!("Worker terminated abnormally: {}", e);
            }
        }
    }
}

/// Path of a task inside the swept directory
pub fn task_path(directory: &Path, task: &DeletionTask) -> PathBuf {
    directory.join(&task.file_name)
}
