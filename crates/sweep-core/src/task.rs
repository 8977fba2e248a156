use serde::{Deserialize, Serialize};

/// One pending attempt to delete a file.
///
/// A task is created once per matching file with `retry_count == 0`. Every
/// failed or timed-out attempt bumps the counter by one before the task goes
/// back to the queue; once `retry_count` reaches the configured limit the task
/// is never queued again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionTask {
    /// File name relative to the directory being swept
    pub file_name: String,

    /// How many attempts have already failed or timed out
    pub retry_count: u32,
}

impl DeletionTask {
    pub fn new(file_name: impl Into<String>) -> Self {
        DeletionTask {
            file_name: file_name.into(),
            retry_count: 0,
        }
    }

    /// Check if another attempt is allowed under `max_retries`
    pub fn can_retry(&self, max_retries: u32) -> bool {
        self.retry_count < max_retries
    }

    /// Record a failed attempt
    pub fn retry(&mut self) {
        self.retry_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_task_creation() {
        let task = DeletionTask::new("a.rdp");
        assert_eq!(task.file_name, "a.rdp");
        assert_eq!(task.retry_count, 0);
    }

    #[test]
    fn test_zero_retries_never_retries() {
        let task = DeletionTask::new("a.rdp");
        assert!(!task.can_retry(0));
    }

    #[test]
    fn test_retry_until_exhausted() {
        let mut task = DeletionTask::new("a.rdp");

        // 1 initial attempt + 3 retries
        let mut attempts = 1;
        while task.can_retry(3) {
            task.retry();
            attempts += 1;
        }

        assert_eq!(attempts, 4);
        assert_eq!(task.retry_count, 3);
    }

    proptest! {
        #[test]
        fn prop_retry_count_never_exceeds_limit(max_retries in 0u32..50, failures in 0u32..100) {
            let mut task = DeletionTask::new("f.rdp");
            for _ in 0..failures {
                if !task.can_retry(max_retries) {
                    break;
                }
                let before = task.retry_count;
                task.retry();
                prop_assert_eq!(task.retry_count, before + 1);
            }
            prop_assert!(task.retry_count <= max_retries);
        }
    }
}
