//! Typing presence - who is currently typing in a room

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::value_objects::{RoomName, UserName};

/// A single typing marker, refreshed by each heartbeat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    pub room: RoomName,
    pub user: UserName,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_seen_at: DateTime<Utc>,
}

impl PresenceEntry {
    /// Create a new presence entry
    #[must_use]
    pub fn new(room: RoomName, user: UserName, last_seen_at: DateTime<Utc>) -> Self {
        Self {
            room,
            user,
            last_seen_at,
        }
    }

    /// Record a fresh heartbeat
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_seen_at = at;
    }
}

/// The full set of users typing in a room at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    pub room: RoomName,
    pub users: BTreeSet<UserName>,
}

impl PresenceSnapshot {
    /// Create a snapshot
    #[must_use]
    pub fn new(room: RoomName, users: BTreeSet<UserName>) -> Self {
        Self { room, users }
    }

    /// An empty snapshot for `room`
    #[must_use]
    pub fn empty(room: RoomName) -> Self {
        Self::new(room, BTreeSet::new())
    }

    /// Users typing other than `viewer`, in name order
    pub fn others<'a>(&'a self, viewer: &'a UserName) -> impl Iterator<Item = &'a UserName> + 'a {
        self.users.iter().filter(move |user| *user != viewer)
    }

    /// Check if `user` is typing
    pub fn contains(&self, user: &UserName) -> bool {
        self.users.contains(user)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.users.len()
    }
}
