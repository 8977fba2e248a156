pub mod collector;
pub mod engine;
pub mod executor;
pub mod queue;
pub mod worker;

pub use collector::{DeletionReport, TaskOutcome};
pub use engine::{list_entries, DeletionEngine};
pub use executor::{AttemptExecutor, AttemptOutcome, FileRemover, StdRemover};
pub use queue::DeletionQueue;
pub use worker::{Worker, WorkerPool};
