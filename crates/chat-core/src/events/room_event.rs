//! Room events - emitted by the channel store on every state change
//!
//! Events of one room are produced under that room's write lock, so their order
//! is the order in which the mutations were applied.

use serde::{Deserialize, Serialize};

use crate::entities::{Message, PresenceSnapshot};
use crate::value_objects::RoomName;

/// All possible room events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomEvent {
    /// A message was appended to the room log
    MessageAppended(Message),
    /// The set of typing users changed
    PresenceChanged(PresenceSnapshot),
}

impl RoomEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MessageAppended(_) => "MESSAGE_APPENDED",
            Self::PresenceChanged(_) => "PRESENCE_CHANGED",
        }
    }

    /// Room the event belongs to
    pub fn room(&self) -> &RoomName {
        match self {
            Self::MessageAppended(message) => &message.room,
            Self::PresenceChanged(snapshot) => &snapshot.room,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{MessageId, UserName};

    #[test]
    fn test_event_serialization() {
        let room = RoomName::new("lobby").unwrap();
        let event = RoomEvent::MessageAppended(Message::new(
            MessageId::FIRST,
            room.clone(),
            UserName::new("alice").unwrap(),
            "hi".to_string(),
            chrono::Utc::now(),
        ));

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("MESSAGE_APPENDED"));

        let parsed: RoomEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.event_type(), "MESSAGE_APPENDED");
        assert_eq!(parsed.room(), &room);
    }

    #[test]
    fn test_event_type() {
        let event = RoomEvent::PresenceChanged(PresenceSnapshot::empty(RoomName::default()));
        assert_eq!(event.event_type(), "PRESENCE_CHANGED");
        assert_eq!(event.room().as_str(), "global");
    }
}
