//! Test helpers for integration tests
//!
//! Provides a core on virtual time and recording listeners whose events can be
//! awaited with a deadline.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chat_broker::{ChatCore, FnListener, RoomListener};
use chat_core::{Message, MessageId, PresenceSnapshot};
use chat_store::{ManualScheduler, StoreConfig};
use tokio::sync::mpsc;

/// How long a receive waits before the test fails
pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// How long to wait when asserting that nothing arrives
pub const QUIET_PERIOD: Duration = Duration::from_millis(50);

/// A core whose clock and typing expiry run on virtual time
pub struct TestCore {
    pub core: Arc<ChatCore>,
    pub time: ManualScheduler,
}

impl TestCore {
    /// Start a core with default limits. Must be called inside a tokio runtime.
    pub fn start() -> Result<Self> {
        Self::start_with_config(StoreConfig::default())
    }

    pub fn start_with_config(config: StoreConfig) -> Result<Self> {
        let time = ManualScheduler::new();
        let core = ChatCore::builder()
            .config(config)
            .manual_time(&time)
            .build()?;
        Ok(Self {
            core: Arc::new(core),
            time,
        })
    }

    /// Move virtual time forward, running due expiries
    pub fn advance(&self, by: Duration) -> usize {
        self.time.advance(by)
    }
}

/// One callback observed by a recording listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Message(Message),
    Presence(PresenceSnapshot),
}

/// Receiving end of a recording listener
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<Recorded>,
}

/// Listener that forwards every callback into an `EventStream`
pub fn recorder() -> (Arc<dyn RoomListener>, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    let presence_tx = tx.clone();
    let listener = FnListener::new(
        move |message: &Message| {
            tx.send(Recorded::Message(message.clone()))?;
            Ok(())
        },
        move |snapshot: &PresenceSnapshot| {
            presence_tx.send(Recorded::Presence(snapshot.clone()))?;
            Ok(())
        },
    );
    (listener, EventStream { rx })
}

impl EventStream {
    /// Next callback, failing after `RECV_TIMEOUT`
    pub async fn next(&mut self) -> Result<Recorded> {
        tokio::time::timeout(RECV_TIMEOUT, self.rx.recv())
            .await
            .context("timed out waiting for delivery")?
            .context("listener dropped")
    }

    /// Next callback, which must be a message
    pub async fn next_message(&mut self) -> Result<Message> {
        match self.next().await? {
            Recorded::Message(message) => Ok(message),
            other => bail!("expected a message, got {other:?}"),
        }
    }

    /// Next callback, which must be a presence snapshot
    pub async fn next_presence(&mut self) -> Result<PresenceSnapshot> {
        match self.next().await? {
            Recorded::Presence(snapshot) => Ok(snapshot),
            other => bail!("expected a presence snapshot, got {other:?}"),
        }
    }

    /// Exactly `count` messages, in delivery order
    pub async fn messages(&mut self, count: usize) -> Result<Vec<Message>> {
        let mut messages = Vec::with_capacity(count);
        for _ in 0..count {
            messages.push(self.next_message().await?);
        }
        Ok(messages)
    }

    /// Fail if anything arrives within `QUIET_PERIOD`
    pub async fn assert_quiet(&mut self) -> Result<()> {
        match tokio::time::timeout(QUIET_PERIOD, self.rx.recv()).await {
            Err(_) | Ok(None) => Ok(()),
            Ok(Some(event)) => bail!("unexpected delivery: {event:?}"),
        }
    }
}

/// Texts of `messages`, in order
pub fn texts(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.text.clone()).collect()
}

/// Raw ids of `messages`, in order
pub fn ids(messages: &[Message]) -> Vec<u64> {
    messages.iter().map(|m| MessageId::into_inner(m.id)).collect()
}
