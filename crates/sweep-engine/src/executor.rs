use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Filesystem seam used for every delete attempt
#[async_trait]
pub trait FileRemover: Send + Sync {
    async fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Removes files with `tokio::fs::remove_file`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdRemover;

#[async_trait]
impl FileRemover for StdRemover {
    async fn remove(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

/// Outcome of one bounded delete attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    Deleted,
    /// The file was already gone, e.g. removed by an abandoned earlier attempt
    AlreadyAbsent,
    Failed(io::Error),
    Panicked(String),
    TimedOut,
    Cancelled,
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Deleted | AttemptOutcome::AlreadyAbsent)
    }
}

/// Runs delete attempts bounded by a per-attempt timeout.
///
/// Each attempt is spawned as its own task and only its `JoinHandle` is
/// raced against the timer. When the timer wins the handle is dropped: the
/// delete keeps running in the background and may still remove the file later.
/// `NotFound` is therefore reported as `AlreadyAbsent` rather than a failure.
pub struct AttemptExecutor {
    remover: Arc<dyn FileRemover>,
    attempt_timeout: Duration,
    cancel: CancellationToken,
}

impl AttemptExecutor {
    pub fn new(
        remover: Arc<dyn FileRemover>,
        attempt_timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        AttemptExecutor {
            remover,
            attempt_timeout,
            cancel,
        }
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    pub async fn attempt(&self, path: &Path) -> AttemptOutcome {
        let remover = self.remover.clone();
        let target: PathBuf = path.to_path_buf();
        let handle = tokio::spawn(async move { remover.remove(&target).await });

        let joined = tokio::select! {
            joined = timeout(self.attempt_timeout, handle) => joined,
            _ = self.cancel.cancelled() => {
                debug!("Attempt on {} abandoned by cancellation", path.display());
                return AttemptOutcome::Cancelled;
            }
        };

        match joined {
            Ok(Ok(Ok(()))) => AttemptOutcome::Deleted,
            Ok(Ok(Err(e))) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} already absent", path.display());
                AttemptOutcome::AlreadyAbsent
            }
            Ok(Ok(Err(e))) => AttemptOutcome::Failed(e),
            Ok(Err(join_error)) => {
                let message = if join_error.is_panic() {
                    let payload = join_error.into_panic();
                    payload
                        .downcast_ref::<String>()
                        .cloned()
                        .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
                        .unwrap_or_else(|| "unknown panic".to_string())
                } else {
                    "delete attempt was cancelled by the runtime".to_string()
                };
                warn!("Delete attempt on {} panicked: {}", path.display(), message);
                AttemptOutcome::Panicked(message)
            }
            Err(_) => {
                warn!(
                    "Delete attempt on {} timed out after {:?}",
                    path.display(),
                    self.attempt_timeout
                );
                AttemptOutcome::TimedOut
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HangingRemover;

    #[async_trait]
    impl FileRemover for HangingRemover {
        async fn remove(&self, _path: &Path) -> io::Result<()> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        }
    }

    struct DeniedRemover;

    #[async_trait]
    impl FileRemover for DeniedRemover {
        async fn remove(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"))
        }
    }

    struct PanickingRemover;

    #[async_trait]
    impl FileRemover for PanickingRemover {
        async fn remove(&self, _path: &Path) -> io::Result<()> {
            panic!("disk on fire");
        }
    }

    fn executor(remover: Arc<dyn FileRemover>, timeout_ms: u64) -> AttemptExecutor {
        AttemptExecutor::new(
            remover,
            Duration::from_millis(timeout_ms),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn test_deletes_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.rdp");
        std::fs::write(&path, b"x").unwrap();

        let outcome = executor(Arc::new(StdRemover), 1000).attempt(&path).await;
        assert!(matches!(outcome, AttemptOutcome::Deleted));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_already_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.rdp");

        let outcome = executor(Arc::new(StdRemover), 1000).attempt(&path).await;
        assert!(matches!(outcome, AttemptOutcome::AlreadyAbsent));
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_timeout() {
        let outcome = executor(Arc::new(HangingRemover), 50)
            .attempt(Path::new("/tmp/slow.rdp"))
            .await;
        assert!(matches!(outcome, AttemptOutcome::TimedOut));
    }

    #[tokio::test]
    async fn test_failure() {
        let outcome = executor(Arc::new(DeniedRemover), 1000)
            .attempt(Path::new("/tmp/locked.rdp"))
            .await;
        match outcome {
            AttemptOutcome::Failed(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let outcome = executor(Arc::new(PanickingRemover), 1000)
            .attempt(Path::new("/tmp/boom.rdp"))
            .await;
        match outcome {
            AttemptOutcome::Panicked(message) => assert!(message.contains("disk on fire")),
            other => panic!("Expected Panicked, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancellation_wins_over_slow_attempt() {
        let cancel = CancellationToken::new();
        let executor = AttemptExecutor::new(
            Arc::new(HangingRemover),
            Duration::from_secs(5),
            cancel.clone(),
        );

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let outcome = executor.attempt(Path::new("/tmp/slow.rdp")).await;
        assert!(matches!(outcome, AttemptOutcome::Cancelled));
    }
}
