//! # chat-core
//!
//! Domain layer containing the chat entities, value objects, room events, and the ports
//! (clock, scheduler, archive) the store and broker are written against.
//! This crate has zero dependencies on any runtime.

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Connectivity, Message, PresenceEntry, PresenceSnapshot};
pub use error::{CoreResult, DomainError};
pub use events::RoomEvent;
pub use traits::{Clock, MessageArchive, ScheduledTask, Scheduler, SystemClock, Task};
pub use value_objects::{
    ClientId, MessageId, MessageIdParseError, RoomName, UserName, RESERVED_KEY_CHARS,
};
