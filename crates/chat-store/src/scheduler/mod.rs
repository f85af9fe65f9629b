//! Scheduler implementations
//!
//! - `TokioScheduler`: spawns a sleeping task on a tokio runtime
//! - `ManualScheduler`: virtual time, advanced explicitly (tests and simulations)

mod manual;
mod tokio_scheduler;

pub use manual::ManualScheduler;
pub use tokio_scheduler::TokioScheduler;
