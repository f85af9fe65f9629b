//! Deferred, cancelable work
//!
//! Typing expiry is the only background work in the core. It is expressed against
//! this trait so tests can drive it with virtual time.

use std::time::Duration;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a scheduled task
pub trait ScheduledTask: Send + Sync {
    /// Prevent the task from running. Has no effect once the task has started.
    fn cancel(&self);
}

/// Runs tasks after a delay
pub trait Scheduler: Send + Sync {
    /// Schedule `task` to run once after `delay`.
    ///
    /// Implementations must not run the task synchronously inside this call.
    fn schedule(&self, delay: Duration, task: Task) -> Box<dyn ScheduledTask>;
}
