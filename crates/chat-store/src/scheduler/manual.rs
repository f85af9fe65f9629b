//! Manually driven scheduler and clock
//!
//! Time only moves when `advance` is called. Due tasks run on the calling thread,
//! in due order, with the scheduler's lock released.

use chat_core::{Clock, ScheduledTask, Scheduler, Task};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Pending {
    task: Task,
    cancelled: Arc<AtomicBool>,
}

struct ManualState {
    origin: DateTime<Utc>,
    elapsed: Duration,
    seq: u64,
    pending: BTreeMap<(Duration, u64), Pending>,
}

/// Virtual-time `Scheduler` that is also the matching `Clock`
#[derive(Clone)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    /// Start virtual time at the current wall-clock instant
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Start virtual time at `origin`
    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                origin,
                elapsed: Duration::ZERO,
                seq: 0,
                pending: BTreeMap::new(),
            })),
        }
    }

    /// Virtual time elapsed since the origin
    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    /// Number of scheduled tasks that have neither run nor been cancelled
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .pending
            .values()
            .filter(|p| !p.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Move time forward by `by`, running every task that falls due.
    ///
    /// Tasks scheduled by a running task are run too if they fall due within the
    /// window. Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.lock().elapsed + by;
        let mut ran = 0;

        loop {
            let next = {
                let mut state = self.state.lock();
                let due = state
                    .pending
                    .first_key_value()
                    .map(|(key, _)| *key)
                    .filter(|(at, _)| *at <= target);
                due.and_then(|key| {
                    state.elapsed = state.elapsed.max(key.0);
                    state.pending.remove(&key)
                })
            };

            let Some(pending) = next else { break };
            if pending.cancelled.load(Ordering::SeqCst) {
                continue;
            }
            (pending.task)();
            ran += 1;
        }

        self.state.lock().elapsed = target;
        ran
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("elapsed", &self.elapsed())
            .field("pending", &self.pending())
            .finish()
    }
}

impl Clock for ManualScheduler {
    fn now(&self) -> DateTime<Utc> {
        let state = self.state.lock();
        state.origin
            + chrono::Duration::from_std(state.elapsed).unwrap_or(chrono::Duration::zero())
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> Box<dyn ScheduledTask> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut state = self.state.lock();
        state.seq += 1;
        let key = (state.elapsed + delay, state.seq);
        state.pending.insert(
            key,
            Pending {
                task,
                cancelled: cancelled.clone(),
            },
        );
        Box::new(ManualTask(cancelled))
    }
}

struct ManualTask(Arc<AtomicBool>);

impl ScheduledTask for ManualTask {
    fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}
