//! Message entity - an immutable chat message in a room log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{MessageId, RoomName, UserName};

/// Message entity
///
/// Serialized as `{id, room, user, text, serverTimestamp}` with the timestamp in
/// milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub room: RoomName,
    pub user: UserName,
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub server_timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new Message
    pub fn new(
        id: MessageId,
        room: RoomName,
        user: UserName,
        text: String,
        server_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            room,
            user,
            text,
            server_timestamp,
        }
    }

    /// Check if the message was written by `user`
    #[inline]
    pub fn is_from(&self, user: &UserName) -> bool {
        &self.user == user
    }

    /// Get a truncated preview of the message text
    pub fn preview(&self, max_len: usize) -> &str {
        if self.text.len() <= max_len {
            &self.text
        } else {
            let mut end = max_len;
            while !self.text.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.text[..end]
        }
    }
}
