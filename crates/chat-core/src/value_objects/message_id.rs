//! Message ID - per-room monotonic sequence number
//!
//! IDs are assigned by the channel store under the room's write lock, starting at 1.
//! Within a room a larger ID always means a later append.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Per-room message sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MessageId(u64);

impl MessageId {
    /// The first ID handed out in a fresh room
    pub const FIRST: MessageId = MessageId(1);

    /// Create a MessageId from a raw value
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner value
    #[inline]
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// Check if the ID is zero (never assigned)
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The ID that follows this one
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self, MessageIdParseError> {
        s.parse::<u64>()
            .map(MessageId)
            .map_err(|_| MessageIdParseError::InvalidFormat)
    }
}

/// Error when parsing a MessageId from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MessageIdParseError {
    #[error("invalid message id format")]
    InvalidFormat,
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MessageId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<MessageId> for u64 {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

impl std::str::FromStr for MessageId {
    type Err = MessageIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageId::parse(s)
    }
}

impl Serialize for MessageId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

// Accept both numbers and numeric strings
impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct MessageIdVisitor;

        impl Visitor<'_> for MessageIdVisitor {
            type Value = MessageId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a non-negative integer or numeric string")
            }

            fn visit_u64<E>(self, value: u64) -> Result<MessageId, E>
            where
                E: de::Error,
            {
                Ok(MessageId(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<MessageId, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(MessageId)
                    .map_err(|_| de::Error::custom("message id must not be negative"))
            }

            fn visit_str<E>(self, value: &str) -> Result<MessageId, E>
            where
                E: de::Error,
            {
                value
                    .parse::<u64>()
                    .map(MessageId)
                    .map_err(|_| de::Error::custom("invalid message id string"))
            }
        }

        deserializer.deserialize_any(MessageIdVisitor)
    }
}
