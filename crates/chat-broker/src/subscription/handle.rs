//! Subscription handles
//!
//! A subscription goes `Active -> Unsubscribed` exactly once. The status is a single
//! atomic that the delivery task checks before every callback and `unsubscribe` flips
//! without waiting, so no callback starts after `unsubscribe` returns and no call on a
//! handle ever blocks on a running callback, including from inside one.

use super::listener::RoomListener;
use chat_core::{ClientId, RoomEvent, RoomName};
use chat_store::{ChannelStore, SinkId};
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

/// Broker-assigned subscription identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Lifecycle state of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SubscriptionStatus {
    /// Receiving events
    Active = 0,
    /// Torn down; never delivers again
    Unsubscribed = 1,
}

impl SubscriptionStatus {
    const fn from_u8(value: u8) -> Self {
        if value == Self::Active as u8 {
            Self::Active
        } else {
            Self::Unsubscribed
        }
    }
}

struct HandleInner {
    id: SubscriptionId,
    client: ClientId,
    room: RoomName,
    sink: SinkId,
    store: Arc<ChannelStore>,
    status: AtomicU8,
    failed: AtomicU64,
}

/// Handle to one subscription. Clones refer to the same subscription.
#[derive(Clone)]
pub struct SubscriptionHandle {
    inner: Arc<HandleInner>,
}

impl SubscriptionHandle {
    pub(crate) fn new(
        id: SubscriptionId,
        client: ClientId,
        room: RoomName,
        sink: SinkId,
        store: Arc<ChannelStore>,
    ) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id,
                client,
                room,
                sink,
                store,
                status: AtomicU8::new(SubscriptionStatus::Active as u8),
                failed: AtomicU64::new(0),
            }),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.inner.id
    }

    /// Client that owns the subscription
    pub fn client(&self) -> ClientId {
        self.inner.client
    }

    /// Subscribed room
    pub fn room(&self) -> &RoomName {
        &self.inner.room
    }

    pub fn status(&self) -> SubscriptionStatus {
        SubscriptionStatus::from_u8(self.inner.status.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.status() == SubscriptionStatus::Active
    }

    /// Number of callbacks that returned an error or panicked
    pub fn failed_deliveries(&self) -> u64 {
        self.inner.failed.load(Ordering::Relaxed)
    }

    /// Stop delivery and detach from the room.
    ///
    /// Idempotent: returns `true` only for the call that performed the teardown.
    /// Never waits for a callback in flight; safe to call from inside any callback.
    pub fn unsubscribe(&self) -> bool {
        let previous = self
            .inner
            .status
            .swap(SubscriptionStatus::Unsubscribed as u8, Ordering::AcqRel);
        if SubscriptionStatus::from_u8(previous) == SubscriptionStatus::Unsubscribed {
            return false;
        }

        // Dropping the sink closes the channel, which ends the delivery task
        self.inner.store.detach(&self.inner.room, self.inner.sink);

        tracing::debug!(
            subscription_id = %self.inner.id,
            client_id = %self.inner.client,
            room = %self.inner.room,
            "Unsubscribed"
        );
        true
    }

    /// Hand one event to `listener` unless the subscription has ended.
    ///
    /// Returns whether the subscription is still active afterwards.
    pub(crate) fn deliver(&self, event: &RoomEvent, listener: &dyn RoomListener) -> bool {
        if !self.is_active() {
            return false;
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| match event {
            RoomEvent::MessageAppended(message) => listener.on_message(message),
            RoomEvent::PresenceChanged(snapshot) => listener.on_presence(snapshot),
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(error)) => self.record_failure(event, &format!("{error:#}")),
            Err(panic) => self.record_failure(event, &panic_message(panic.as_ref())),
        }

        self.is_active()
    }

    fn record_failure(&self, event: &RoomEvent, reason: &str) {
        let failed = self.inner.failed.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::warn!(
            subscription_id = %self.inner.id,
            room = %self.inner.room,
            event_type = event.event_type(),
            failed,
            error = %reason,
            "Listener failed"
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}

impl PartialEq for SubscriptionHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for SubscriptionHandle {}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.inner.id)
            .field("client", &self.inner.client)
            .field("room", &self.inner.room)
            .field("status", &self.status())
            .field("failed_deliveries", &self.failed_deliveries())
            .finish()
    }
}
