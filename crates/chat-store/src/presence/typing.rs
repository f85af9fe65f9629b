//! Typing indicators for a single room.
//!
//! Every heartbeat bumps the entry's generation. An expiry timer only removes the
//! entry when it still carries the generation it was armed for, so a timer that
//! fires after a refresh is a no-op. Callers hold the room lock around every call,
//! which makes refresh, clear, and expiry mutually exclusive.

use chat_core::{PresenceEntry, RoomName, ScheduledTask, UserName};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};

struct TypingSlot {
    entry: PresenceEntry,
    generation: u64,
    expiry: Option<Box<dyn ScheduledTask>>,
}

impl TypingSlot {
    fn cancel_expiry(&mut self) {
        if let Some(timer) = self.expiry.take() {
            timer.cancel();
        }
    }
}

/// Typing entries of one room keyed by user
#[derive(Default)]
pub struct TypingTracker {
    slots: HashMap<UserName, TypingSlot>,
    next_generation: u64,
}

impl TypingTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the entry for `user` with a fresh `last_seen_at`.
    ///
    /// Cancels any pending expiry. Returns whether the user was newly added and
    /// the generation the next expiry timer must be armed with.
    pub fn refresh(&mut self, room: &RoomName, user: &UserName, now: DateTime<Utc>) -> (bool, u64) {
        self.next_generation += 1;
        let generation = self.next_generation;

        if let Some(slot) = self.slots.get_mut(user) {
            slot.cancel_expiry();
            slot.entry.touch(now);
            slot.generation = generation;
            (false, generation)
        } else {
            self.slots.insert(
                user.clone(),
                TypingSlot {
                    entry: PresenceEntry::new(room.clone(), user.clone(), now),
                    generation,
                    expiry: None,
                },
            );
            (true, generation)
        }
    }

    /// Attach the expiry timer armed for `generation`.
    ///
    /// If the entry has moved on (or is gone) the timer is cancelled instead.
    pub fn arm(&mut self, user: &UserName, generation: u64, timer: Box<dyn ScheduledTask>) {
        match self.slots.get_mut(user) {
            Some(slot) if slot.generation == generation => {
                slot.cancel_expiry();
                slot.expiry = Some(timer);
            }
            _ => timer.cancel(),
        }
    }

    /// Remove the entry for `user` and cancel its timer. Returns whether it existed.
    pub fn clear(&mut self, user: &UserName) -> bool {
        match self.slots.remove(user) {
            Some(mut slot) => {
                slot.cancel_expiry();
                true
            }
            None => false,
        }
    }

    /// Remove the entry for `user` if it was not refreshed since `generation` was armed.
    pub fn expire(&mut self, user: &UserName, generation: u64) -> bool {
        let current = self
            .slots
            .get(user)
            .is_some_and(|slot| slot.generation == generation);
        if current {
            self.slots.remove(user);
        }
        current
    }

    /// Cancel every pending timer and drop all entries
    pub fn clear_all(&mut self) {
        for (_, mut slot) in self.slots.drain() {
            slot.cancel_expiry();
        }
    }

    /// Users currently typing
    pub fn users(&self) -> BTreeSet<UserName> {
        self.slots.keys().cloned().collect()
    }

    /// Entry for `user`, if typing
    pub fn entry(&self, user: &UserName) -> Option<&PresenceEntry> {
        self.slots.get(user).map(|slot| &slot.entry)
    }

    /// Number of entries with an armed expiry timer
    pub fn armed_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.expiry.is_some()).count()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl std::fmt::Debug for TypingTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingTracker")
            .field("users", &self.users())
            .field("armed", &self.armed_count())
            .finish()
    }
}
