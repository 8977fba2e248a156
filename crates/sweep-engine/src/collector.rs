use std::path::PathBuf;
use sweep_core::{CombinedFailure, TerminalError};
use tokio::sync::mpsc;

/// Final state of one task
#[derive(Debug)]
pub enum TaskOutcome {
    Deleted { file_path: PathBuf, attempts: u32 },
    AlreadyAbsent { file_path: PathBuf, attempts: u32 },
    Failed(TerminalError),
}

/// Cloneable handle workers use to report task outcomes
#[derive(Clone)]
pub struct OutcomeSender {
    tx: mpsc::UnboundedSender<TaskOutcome>,
}

impl OutcomeSender {
    pub fn send(&self, outcome: TaskOutcome) {
        // The receiver lives in the driver until every sender is dropped
        let _ = self.tx.send(outcome);
    }
}

/// Receiving side, read once all workers have exited
pub struct OutcomeCollector {
    rx: mpsc::UnboundedReceiver<TaskOutcome>,
}

pub fn outcome_channel() -> (OutcomeSender, OutcomeCollector) {
    let (tx, rx) = mpsc::unbounded_channel();
    (OutcomeSender { tx }, OutcomeCollector { rx })
}

impl OutcomeCollector {
    /// Drain every outcome into a report. Waits until all senders are gone.
    pub async fn collect(mut self, matched: usize) -> DeletionReport {
        let mut report = DeletionReport {
            matched,
            ..DeletionReport::default()
        };

        while let Some(outcome) = self.rx.recv().await {
            report.record(outcome);
        }

        report
    }
}

/// Summary of a deletion run
#[derive(Debug, Default)]
pub struct DeletionReport {
    /// Files that matched the extension filter
    pub matched: usize,
    /// Files removed by this run
    pub deleted: usize,
    /// Files found missing on an attempt, counted as success
    pub already_absent: usize,
    /// Attempts made by tasks that succeeded
    pub successful_attempts: u64,
    /// Terminal errors in arrival order
    pub failures: Vec<TerminalError>,
}

impl DeletionReport {
    fn record(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Deleted { attempts, .. } => {
                self.deleted += 1;
                self.successful_attempts += u64::from(attempts);
            }
            TaskOutcome::AlreadyAbsent { attempts, .. } => {
                self.already_absent += 1;
                self.successful_attempts += u64::from(attempts);
            }
            TaskOutcome::Failed(error) => self.failures.push(error),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.deleted + self.already_absent
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn the report into the run result: `Err` if any file was left behind
    pub fn into_result(self) -> Result<DeletionReport, CombinedFailure> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(CombinedFailure::new(self.failures))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweep_core::FailureReason;

    fn timed_out(name: &str) -> TaskOutcome {
        TaskOutcome::Failed(TerminalError {
            file_path: PathBuf::from(name),
            reason: FailureReason::Timeout {
                timeout: std::time::Duration::from_secs(1),
            },
            retries_exhausted: 3,
        })
    }

    #[tokio::test]
    async fn test_collect_after_senders_dropped() {
        let (tx, collector) = outcome_channel();
        let worker_tx = tx.clone();
        drop(tx);

        worker_tx.send(TaskOutcome::Deleted {
            file_path: PathBuf::from("a.rdp"),
            attempts: 1,
        });
        worker_tx.send(TaskOutcome::AlreadyAbsent {
            file_path: PathBuf::from("b.rdp"),
            attempts: 2,
        });
        worker_tx.send(timed_out("c.rdp"));
        drop(worker_tx);

        let report = collector.collect(3).await;
        assert_eq!(report.matched, 3);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.already_absent, 1);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.successful_attempts, 3);
        assert_eq!(report.failures.len(), 1);
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_into_result() {
        let (tx, collector) = outcome_channel();
        tx.send(TaskOutcome::Deleted {
            file_path: PathBuf::from("a.rdp"),
            attempts: 1,
        });
        drop(tx);
        assert!(collector.collect(1).await.into_result().is_ok());

        let (tx, collector) = outcome_channel();
        tx.send(timed_out("a.rdp"));
        tx.send(timed_out("b.rdp"));
        drop(tx);
        let combined = collector.collect(2).await.into_result().unwrap_err();
        assert_eq!(combined.len(), 2);
    }
}
