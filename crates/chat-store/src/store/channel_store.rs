//! Channel store
//!
//! Owns every room. Rooms are created lazily on first use and live for the life
//! of the store. Different rooms never contend on the same lock.

use super::room::Room;
use super::{EventSink, SinkId, StoreConfig};
use chat_core::{
    Clock, CoreResult, DomainError, Message, PresenceEntry, PresenceSnapshot, RoomName, Scheduler,
    UserName,
};
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Per-room message logs and typing presence
pub struct ChannelStore {
    /// Rooms by name
    rooms: DashMap<RoomName, Arc<Room>>,

    config: StoreConfig,

    /// Source of server timestamps
    clock: Arc<dyn Clock>,

    /// Runs typing expiry
    scheduler: Arc<dyn Scheduler>,

    next_sink: AtomicU64,
}

impl ChannelStore {
    /// Create an empty store
    pub fn new(config: StoreConfig, clock: Arc<dyn Clock>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            rooms: DashMap::new(),
            config,
            clock,
            scheduler,
            next_sink: AtomicU64::new(1),
        }
    }

    /// Create a store wrapped in Arc
    pub fn new_shared(
        config: StoreConfig,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Arc<Self> {
        Arc::new(Self::new(config, clock, scheduler))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn room(&self, name: &RoomName) -> Option<Arc<Room>> {
        self.rooms.get(name).map(|room| room.value().clone())
    }

    fn room_or_create(&self, name: &RoomName) -> Arc<Room> {
        self.rooms
            .entry(name.clone())
            .or_insert_with(|| {
                tracing::debug!(room = %name, "Room created");
                Room::new(name.clone())
            })
            .value()
            .clone()
    }

    /// Append a message to `room`.
    ///
    /// The text is trimmed before it is stored. Blank text fails with
    /// `ValidationError` and text over the configured maximum with `ContentTooLong`;
    /// neither touches the log.
    pub fn append(&self, room: &RoomName, user: &UserName, text: &str) -> CoreResult<Message> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::empty_message());
        }
        if text.chars().count() > self.config.max_message_length {
            return Err(DomainError::ContentTooLong {
                max: self.config.max_message_length,
            });
        }

        let message = self.room_or_create(room).append(
            user.clone(),
            text.to_string(),
            self.clock.now(),
            self.config.history_limit,
        );

        tracing::trace!(room = %room, user = %user, message_id = %message.id, "Message appended");
        Ok(message)
    }

    /// Mark `user` as typing (refreshing its expiry) or clear the mark.
    ///
    /// Returns whether the room's typing set changed. Clearing a user who is not
    /// typing is a no-op.
    pub fn set_typing(&self, room: &RoomName, user: &UserName, is_typing: bool) -> bool {
        if is_typing {
            self.room_or_create(room).start_typing(
                user,
                self.clock.now(),
                self.config.typing_ttl,
                self.scheduler.as_ref(),
            )
        } else {
            self.room(room).is_some_and(|r| r.stop_typing(user))
        }
    }

    /// The last `limit` messages of `room`, oldest first.
    ///
    /// `limit` is clamped to the history limit.
    pub fn get_recent(&self, room: &RoomName, limit: usize) -> Vec<Message> {
        let limit = limit.min(self.config.history_limit);
        self.room(room).map(|r| r.recent(limit)).unwrap_or_default()
    }

    /// Users typing in `room` other than `requester`
    pub fn get_presence(&self, room: &RoomName, requester: &UserName) -> BTreeSet<UserName> {
        let mut users = self
            .room(room)
            .map(|r| r.typing_users())
            .unwrap_or_default();
        users.remove(requester);
        users
    }

    /// Everyone typing in `room`
    pub fn presence_snapshot(&self, room: &RoomName) -> PresenceSnapshot {
        self.room(room).map_or_else(
            || PresenceSnapshot::empty(room.clone()),
            |r| r.presence_snapshot(),
        )
    }

    /// The typing entry for `user` in `room`, if any
    pub fn presence_entry(&self, room: &RoomName, user: &UserName) -> Option<PresenceEntry> {
        self.room(room).and_then(|r| r.presence_entry(user))
    }

    /// Attach `sink` to `room`.
    ///
    /// The sink first receives the backfill (oldest first) and the current presence
    /// snapshot, then every later event of the room. Returns `None` when the sink's
    /// receiver is already gone.
    pub fn attach(&self, room: &RoomName, sink: EventSink) -> Option<SinkId> {
        let id = SinkId(self.next_sink.fetch_add(1, Ordering::Relaxed));
        let attached = self
            .room_or_create(room)
            .attach(id, sink, self.config.history_limit);

        if attached {
            tracing::debug!(room = %room, sink_id = %id, "Sink attached");
            Some(id)
        } else {
            None
        }
    }

    /// Detach a sink. Returns whether it was attached to `room`.
    pub fn detach(&self, room: &RoomName, id: SinkId) -> bool {
        let detached = self.room(room).is_some_and(|r| r.detach(id));
        if detached {
            tracing::debug!(room = %room, sink_id = %id, "Sink detached");
        }
        detached
    }

    /// Number of messages retained for `room`
    pub fn message_count(&self, room: &RoomName) -> usize {
        self.room(room).map_or(0, |r| r.len())
    }

    /// Number of sinks attached to `room`
    pub fn sink_count(&self, room: &RoomName) -> usize {
        self.room(room).map_or(0, |r| r.sink_count())
    }

    /// Number of rooms created so far
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Names of all rooms
    pub fn room_names(&self) -> Vec<RoomName> {
        self.rooms.iter().map(|r| r.value().name().clone()).collect()
    }

    /// Cancel every pending expiry and drop all typing entries
    pub fn cancel_timers(&self) {
        let rooms: Vec<Arc<Room>> = self.rooms.iter().map(|r| r.value().clone()).collect();
        for room in rooms {
            room.clear_typing();
        }
    }
}

impl std::fmt::Debug for ChannelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelStore")
            .field("rooms", &self.rooms.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
