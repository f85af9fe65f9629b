//! Channel store module
//!
//! Holds every room's message log and typing map, and pushes each mutation to the
//! sinks attached to that room.

mod channel_store;
mod config;
mod room;

pub use channel_store::ChannelStore;
pub use config::StoreConfig;

use chat_core::RoomEvent;
use std::fmt;
use tokio::sync::mpsc;

/// Sending side of a subscriber's event stream, fed under the room lock.
///
/// Bounded: a sink whose buffer is full when an event is emitted is detached,
/// which closes the stream.
pub type EventSink = mpsc::Sender<RoomEvent>;

/// Identifies an attached sink within the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SinkId(u64);

impl SinkId {
    #[inline]
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sink-{}", self.0)
    }
}
