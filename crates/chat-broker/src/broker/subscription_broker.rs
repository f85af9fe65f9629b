//! Subscription broker
//!
//! Binds listeners to rooms of the channel store. Each client holds at most one
//! subscription; subscribing again tears the previous one down first.

use crate::subscription::{run_delivery, RoomListener, SubscriptionHandle, SubscriptionId};
use chat_core::{ClientId, CoreResult, DomainError, RoomName};
use chat_store::ChannelStore;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Manages per-client room subscriptions
pub struct SubscriptionBroker {
    store: Arc<ChannelStore>,

    /// Current subscription of each client
    clients: DashMap<ClientId, SubscriptionHandle>,

    /// Runtime the delivery tasks are spawned on
    runtime: Handle,

    next_id: AtomicU64,
}

impl SubscriptionBroker {
    /// Create a broker over `store`, spawning delivery on `runtime`
    pub fn new(store: Arc<ChannelStore>, runtime: Handle) -> Self {
        Self {
            store,
            clients: DashMap::new(),
            runtime,
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Subscribe `client` to `room`.
    ///
    /// Any previous subscription of the client is fully torn down first, so its
    /// listener receives nothing once this call starts attaching. The new listener
    /// receives the room's backfill (oldest first) and the current presence
    /// snapshot, then every later event of the room exactly once.
    pub fn subscribe(
        &self,
        client: ClientId,
        room: &RoomName,
        listener: Arc<dyn RoomListener>,
    ) -> CoreResult<SubscriptionHandle> {
        if let Some((_, previous)) = self.clients.remove(&client) {
            previous.unsubscribe();
        }

        let (tx, rx) = mpsc::channel(self.store.config().sink_capacity());
        let sink = self
            .store
            .attach(room, tx)
            .ok_or_else(|| DomainError::InternalError("event channel rejected backfill".into()))?;

        let handle =
            SubscriptionHandle::new(self.next_id(), client, room.clone(), sink, self.store.clone());
        self.runtime
            .spawn(run_delivery(handle.clone(), rx, listener));

        // A concurrent subscribe for the same client may have landed in between
        if let Some(raced) = self.clients.insert(client, handle.clone()) {
            raced.unsubscribe();
        }

        tracing::debug!(
            subscription_id = %handle.id(),
            client_id = %client,
            room = %room,
            "Subscribed"
        );
        Ok(handle)
    }

    /// Tear down `handle`. Idempotent; returns whether this call ended it.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        self.clients
            .remove_if(&handle.client(), |_, current| current == handle);
        handle.unsubscribe()
    }

    /// The client's active subscription, if any
    pub fn subscription_of(&self, client: ClientId) -> Option<SubscriptionHandle> {
        self.clients
            .get(&client)
            .map(|entry| entry.value().clone())
            .filter(SubscriptionHandle::is_active)
    }

    /// Number of clients with an active subscription
    pub fn active_count(&self) -> usize {
        self.clients
            .iter()
            .filter(|entry| entry.value().is_active())
            .count()
    }

    /// Tear down every subscription
    pub fn unsubscribe_all(&self) -> usize {
        let clients: Vec<ClientId> = self.clients.iter().map(|entry| *entry.key()).collect();
        let mut ended = 0;
        for client in clients {
            if let Some((_, handle)) = self.clients.remove(&client) {
                if handle.unsubscribe() {
                    ended += 1;
                }
            }
        }
        ended
    }
}

impl std::fmt::Debug for SubscriptionBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionBroker")
            .field("clients", &self.clients.len())
            .finish_non_exhaustive()
    }
}
