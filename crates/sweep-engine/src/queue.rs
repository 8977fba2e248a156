use parking_lot::Mutex;
use std::collections::VecDeque;
use sweep_core::DeletionTask;
use tokio::sync::Notify;

#[derive(Default)]
struct QueueState {
    pending: VecDeque<DeletionTask>,
    /// Tasks handed out by `dequeue` and not yet requeued or completed
    in_flight: usize,
    /// Initial submission is over
    closed: bool,
}

impl QueueState {
    fn is_finished(&self) -> bool {
        self.closed && self.pending.is_empty() && self.in_flight == 0
    }
}

/// Multi-producer, multi-consumer FIFO of deletion tasks.
///
/// `close` only ends initial submission. Consumers see the end of work once
/// the queue is closed, empty, and no dequeued task is still unresolved, so a
/// worker holding a task can always put it back with `requeue`.
pub struct DeletionQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl DeletionQueue {
    pub fn new() -> Self {
        DeletionQueue {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
        }
    }

    /// Submit a fresh task. Returns `false` if submission was already closed.
    pub fn enqueue(&self, task: DeletionTask) -> bool {
        {
            let mut state = self.state.lock();
            if state.closed {
                return false;
            }
            state.pending.push_back(task);
        }
        self.notify.notify_one();
        true
    }

    /// Mark initial submission as done. Calling it twice is a no-op.
    pub fn close(&self) {
        let finished = {
            let mut state = self.state.lock();
            state.closed = true;
            state.is_finished()
        };
        if finished {
            self.notify.notify_waiters();
        }
    }

    /// Wait for the next task. `None` means no task will ever arrive again.
    pub async fn dequeue(&self) -> Option<DeletionTask> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before inspecting state so a concurrent push is not missed
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if let Some(task) = state.pending.pop_front() {
                    state.in_flight += 1;
                    return Some(task);
                }
                if state.is_finished() {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Put a dequeued task back at the tail of the queue
    pub fn requeue(&self, task: DeletionTask) {
        {
            let mut state = self.state.lock();
            debug_assert!(state.in_flight > 0, "requeue without a dequeued task");
            state.in_flight = state.in_flight.saturating_sub(1);
            state.pending.push_back(task);
        }
        self.notify.notify_one();
    }

    /// Resolve a dequeued task for good (deleted or terminal error)
    pub fn complete(&self) {
        let finished = {
            let mut state = self.state.lock();
            debug_assert!(state.in_flight > 0, "complete without a dequeued task");
            state.in_flight = state.in_flight.saturating_sub(1);
            state.is_finished()
        };
        if finished {
            self.notify.notify_waiters();
        }
    }

    /// Take every task that never got dequeued. Used when a run is cancelled.
    pub fn drain_pending(&self) -> Vec<DeletionTask> {
        let drained: Vec<_> = {
            let mut state = self.state.lock();
            state.pending.drain(..).collect()
        };
        self.notify.notify_waiters();
        drained
    }

    pub fn len(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    pub fn is_finished(&self) -> bool {
        self.state.lock().is_finished()
    }
}

impl Default for DeletionQueue {
    fn default() -> Self {
        Self::new()
    }
}
