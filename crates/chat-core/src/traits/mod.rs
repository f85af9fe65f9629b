//! Ports - capabilities the core depends on but does not implement itself
//!
//! The domain layer defines what it needs (time, deferred work, durable storage)
//! and the surrounding crates provide the implementations.

mod archive;
mod clock;
mod scheduler;

pub use archive::MessageArchive;
pub use clock::{Clock, SystemClock};
pub use scheduler::{ScheduledTask, Scheduler, Task};
