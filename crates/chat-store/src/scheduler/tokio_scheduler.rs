//! Scheduler backed by a tokio runtime

use chat_core::{ScheduledTask, Scheduler, Task};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// Runs each task on its own spawned tokio task after a `sleep`
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Schedule onto the given runtime
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Schedule onto the runtime of the calling context, if there is one
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> Box<dyn ScheduledTask> {
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        Box::new(TokioTask(join.abort_handle()))
    }
}

struct TokioTask(AbortHandle);

impl ScheduledTask for TokioTask {
    fn cancel(&self) {
        self.0.abort();
    }
}
