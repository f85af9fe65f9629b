//! Test fixtures and data generators
//!
//! Provides reusable names and archives for integration tests.

use async_trait::async_trait;
use chat_core::{CoreResult, DomainError, Message, MessageArchive, RoomName, UserName};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A room name no other test uses
pub fn unique_room() -> RoomName {
    room(&format!("room-{}", unique_suffix()))
}

pub fn room(name: &str) -> RoomName {
    RoomName::new(name).expect("valid room name")
}

pub fn user(name: &str) -> UserName {
    UserName::new(name).expect("valid user name")
}

/// Archive that records message texts, or fails every write
#[derive(Debug, Default)]
pub struct MemoryArchive {
    pub stored: Mutex<Vec<Message>>,
    pub fail: bool,
}

impl MemoryArchive {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.stored.lock().iter().map(|m| m.text.clone()).collect()
    }
}

#[async_trait]
impl MessageArchive for MemoryArchive {
    async fn persist(&self, message: &Message) -> CoreResult<()> {
        if self.fail {
            return Err(DomainError::ArchiveError("archive offline".to_string()));
        }
        self.stored.lock().push(message.clone());
        Ok(())
    }
}
