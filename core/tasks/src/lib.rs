//! Background task store.
//!
//! Tracks operations that outlive the call that started them: identity,
//! lifecycle status, logs, the final result or error, and one cancellation
//! token per task. Finished tasks are kept for a retention window and then
//! removed by [`TaskStore::cleanup`].

pub mod error;
mod failure;
mod runner;
mod store;
mod task;

pub use error::Result;
pub use error::TaskError;
pub use failure::detect_failure;
pub use runner::DetachedSpawner;
pub use runner::TokioSpawner;
pub use store::TaskStore;
pub use task::BackgroundTask;
pub use task::CancelOutcome;
pub use task::TaskUpdate;
pub use toolrun_protocol::TaskStatus;
