//! Room listeners
//!
//! A listener receives a room's messages (backfill first, then live) and presence
//! snapshots. Both callbacks run on the subscription's delivery task.

use chat_core::{Message, PresenceSnapshot};
use std::fmt;
use std::sync::Arc;

/// Outcome of a listener callback. Errors are logged and counted, never propagated.
pub type ListenerResult = anyhow::Result<()>;

/// Receives the events of one subscribed room
pub trait RoomListener: Send + Sync {
    /// A message was appended (or is part of the backfill)
    fn on_message(&self, message: &Message) -> ListenerResult;

    /// The room's typing set changed (or this is the initial snapshot)
    fn on_presence(&self, presence: &PresenceSnapshot) -> ListenerResult;
}

/// `RoomListener` built from two closures
pub struct FnListener<M, P> {
    on_message: M,
    on_presence: P,
}

impl<M, P> FnListener<M, P>
where
    M: Fn(&Message) -> ListenerResult + Send + Sync + 'static,
    P: Fn(&PresenceSnapshot) -> ListenerResult + Send + Sync + 'static,
{
    /// Wrap the two callbacks, ready to hand to `subscribe`
    pub fn new(on_message: M, on_presence: P) -> Arc<Self> {
        Arc::new(Self {
            on_message,
            on_presence,
        })
    }
}

impl<M, P> RoomListener for FnListener<M, P>
where
    M: Fn(&Message) -> ListenerResult + Send + Sync + 'static,
    P: Fn(&PresenceSnapshot) -> ListenerResult + Send + Sync + 'static,
{
    fn on_message(&self, message: &Message) -> ListenerResult {
        (self.on_message)(message)
    }

    fn on_presence(&self, presence: &PresenceSnapshot) -> ListenerResult {
        (self.on_presence)(presence)
    }
}

impl<M, P> fmt::Debug for FnListener<M, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener").finish_non_exhaustive()
    }
}
