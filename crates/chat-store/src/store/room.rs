//! A single room: message log, typing map, and attached sinks behind one lock

use super::{EventSink, SinkId};
use crate::presence::TypingTracker;
use chat_core::{
    Message, MessageId, PresenceEntry, PresenceSnapshot, RoomEvent, RoomName, Scheduler, UserName,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeSet, VecDeque};
use tokio::sync::mpsc::error::TrySendError;
use std::sync::{Arc, Weak};
use std::time::Duration;

struct RoomState {
    log: VecDeque<Message>,
    last_id: MessageId,
    typing: TypingTracker,
    sinks: Vec<(SinkId, EventSink)>,
}

impl RoomState {
    /// Push `event` to every live sink, dropping closed and overflowing ones
    fn emit(&mut self, room: &RoomName, event: &RoomEvent) {
        self.sinks.retain(|(id, sink)| match sink.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    room = %room,
                    sink_id = %id,
                    capacity = sink.max_capacity(),
                    "Sink buffer full, detaching"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::trace!(sink_id = %id, "Dropping closed sink");
                false
            }
        });
    }

    fn snapshot(&self, room: &RoomName) -> PresenceSnapshot {
        PresenceSnapshot::new(room.clone(), self.typing.users())
    }
}

/// One room. Every mutation holds the room lock, so appends and typing changes are
/// serialized and their events reach each sink in mutation order.
pub(crate) struct Room {
    name: RoomName,
    state: Mutex<RoomState>,
}

impl Room {
    pub(crate) fn new(name: RoomName) -> Arc<Self> {
        Arc::new(Self {
            name,
            state: Mutex::new(RoomState {
                log: VecDeque::new(),
                last_id: MessageId::default(),
                typing: TypingTracker::new(),
                sinks: Vec::new(),
            }),
        })
    }

    pub(crate) fn name(&self) -> &RoomName {
        &self.name
    }

    /// Assign the next id, append, trim to `history_limit`, and notify sinks
    pub(crate) fn append(
        &self,
        user: UserName,
        text: String,
        now: DateTime<Utc>,
        history_limit: usize,
    ) -> Message {
        let mut state = self.state.lock();

        let id = state.last_id.next();
        state.last_id = id;

        let message = Message::new(id, self.name.clone(), user, text, now);
        state.log.push_back(message.clone());
        while state.log.len() > history_limit {
            state.log.pop_front();
        }

        state.emit(&self.name, &RoomEvent::MessageAppended(message.clone()));
        message
    }

    /// The last `limit` messages, oldest first
    pub(crate) fn recent(&self, limit: usize) -> Vec<Message> {
        let state = self.state.lock();
        let skip = state.log.len().saturating_sub(limit);
        state.log.iter().skip(skip).cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().log.len()
    }

    /// Upsert `user`'s typing entry and (re)arm its expiry.
    ///
    /// Returns whether the typing set changed.
    pub(crate) fn start_typing(
        self: &Arc<Self>,
        user: &UserName,
        now: DateTime<Utc>,
        ttl: Duration,
        scheduler: &dyn Scheduler,
    ) -> bool {
        let mut state = self.state.lock();
        let (added, generation) = state.typing.refresh(&self.name, user, now);

        let room: Weak<Self> = Arc::downgrade(self);
        let expiring = user.clone();
        let timer = scheduler.schedule(
            ttl,
            Box::new(move || {
                if let Some(room) = room.upgrade() {
                    room.expire(&expiring, generation);
                }
            }),
        );
        state.typing.arm(user, generation, timer);

        if added {
            let snapshot = state.snapshot(&self.name);
            state.emit(&self.name, &RoomEvent::PresenceChanged(snapshot));
        }
        added
    }

    /// Remove `user`'s typing entry now. Returns whether it existed.
    pub(crate) fn stop_typing(&self, user: &UserName) -> bool {
        let mut state = self.state.lock();
        let removed = state.typing.clear(user);
        if removed {
            let snapshot = state.snapshot(&self.name);
            state.emit(&self.name, &RoomEvent::PresenceChanged(snapshot));
        }
        removed
    }

    /// Expiry callback; a no-op when the entry was refreshed or cleared since
    fn expire(&self, user: &UserName, generation: u64) {
        let mut state = self.state.lock();
        if state.typing.expire(user, generation) {
            tracing::debug!(room = %self.name, user = %user, "Typing entry expired");
            let snapshot = state.snapshot(&self.name);
            state.emit(&self.name, &RoomEvent::PresenceChanged(snapshot));
        } else {
            tracing::trace!(room = %self.name, user = %user, "Stale typing expiry ignored");
        }
    }

    pub(crate) fn typing_users(&self) -> BTreeSet<UserName> {
        self.state.lock().typing.users()
    }

    pub(crate) fn presence_entry(&self, user: &UserName) -> Option<PresenceEntry> {
        self.state.lock().typing.entry(user).cloned()
    }

    pub(crate) fn presence_snapshot(&self) -> PresenceSnapshot {
        self.state.lock().snapshot(&self.name)
    }

    /// Send the backfill and the current presence snapshot to `sink`, then register it.
    ///
    /// Runs under the room lock, so the sink sees every message exactly once: either
    /// in the backfill or as a live event. Fails when the receiver is gone or the
    /// buffer cannot hold the backfill.
    pub(crate) fn attach(&self, id: SinkId, sink: EventSink, backfill: usize) -> bool {
        let mut state = self.state.lock();

        let skip = state.log.len().saturating_sub(backfill);
        for message in state.log.iter().skip(skip) {
            if sink
                .try_send(RoomEvent::MessageAppended(message.clone()))
                .is_err()
            {
                return false;
            }
        }
        if sink
            .try_send(RoomEvent::PresenceChanged(state.snapshot(&self.name)))
            .is_err()
        {
            return false;
        }

        state.sinks.push((id, sink));
        true
    }

    /// Unregister a sink. Returns whether it was attached.
    pub(crate) fn detach(&self, id: SinkId) -> bool {
        let mut state = self.state.lock();
        let before = state.sinks.len();
        state.sinks.retain(|(sink_id, _)| *sink_id != id);
        state.sinks.len() != before
    }

    pub(crate) fn sink_count(&self) -> usize {
        self.state.lock().sinks.len()
    }

    /// Cancel all expiry timers and forget every typing entry without emitting
    pub(crate) fn clear_typing(&self) {
        self.state.lock().typing.clear_all();
    }
}

impl std::fmt::Debug for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Room")
            .field("name", &self.name)
            .field("messages", &state.log.len())
            .field("last_id", &state.last_id)
            .field("typing", &state.typing)
            .field("sinks", &state.sinks.len())
            .finish()
    }
}
