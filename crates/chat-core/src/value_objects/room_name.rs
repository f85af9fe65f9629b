//! Room name - identifies an independent channel of messages and presence

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Validated room name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomName(String);

impl RoomName {
    /// Maximum room name length in characters
    pub const MAX_LEN: usize = 64;

    /// Room used when none is requested
    pub const DEFAULT: &'static str = "global";

    /// Create a room name, trimming surrounding whitespace
    pub fn new(name: impl AsRef<str>) -> Result<Self, DomainError> {
        super::normalize_key(name.as_ref(), Self::MAX_LEN)
            .map(Self)
            .map_err(DomainError::InvalidRoomName)
    }

    /// Resolve a location fragment such as `#lobby` into a room name.
    ///
    /// A blank fragment resolves to the default room.
    pub fn from_fragment(fragment: &str) -> Result<Self, DomainError> {
        let name = fragment.trim().trim_start_matches('#').trim();
        if name.is_empty() {
            Ok(Self::default())
        } else {
            Self::new(name)
        }
    }

    /// Borrow the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RoomName {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RoomName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomName> for String {
    fn from(room: RoomName) -> Self {
        room.0
    }
}

impl std::str::FromStr for RoomName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
