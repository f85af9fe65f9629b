//! ChatCore
//!
//! One explicit instance owning the channel store, the subscription broker, and
//! the connectivity signal. Constructed through `ChatCore::builder()` and torn
//! down with `shutdown()`, which also runs on drop.

use super::ChatCoreBuilder;
use crate::broker::SubscriptionBroker;
use crate::connectivity::ConnectivitySignal;
use crate::subscription::{RoomListener, SubscriptionHandle};
use chat_core::{
    ClientId, Clock, Connectivity, CoreResult, DomainError, Message, MessageArchive, RoomName,
    Scheduler, UserName,
};
use chat_store::{ChannelStore, StoreConfig};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{info, instrument};

/// In-process message and presence synchronization core
pub struct ChatCore {
    store: Arc<ChannelStore>,
    broker: SubscriptionBroker,
    connectivity: ConnectivitySignal,
    archive: Option<Arc<dyn MessageArchive>>,
    runtime: Handle,
    shut_down: AtomicBool,
}

impl ChatCore {
    pub fn builder() -> ChatCoreBuilder {
        ChatCoreBuilder::new()
    }

    pub(super) fn assemble(
        config: StoreConfig,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn Scheduler>,
        archive: Option<Arc<dyn MessageArchive>>,
        runtime: Handle,
    ) -> Self {
        let store = ChannelStore::new_shared(config, clock, scheduler);
        let broker = SubscriptionBroker::new(store.clone(), runtime.clone());

        info!(
            history_limit = config.history_limit,
            typing_ttl_ms = config.typing_ttl.as_millis() as u64,
            archive = archive.is_some(),
            "Chat core started"
        );

        Self {
            store,
            broker,
            connectivity: ConnectivitySignal::default(),
            archive,
            runtime,
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        self.store.config()
    }

    fn ensure_running(&self) -> CoreResult<()> {
        if self.shut_down.load(Ordering::SeqCst) {
            Err(DomainError::ShutDown)
        } else {
            Ok(())
        }
    }

    /// Append a message to `room`.
    ///
    /// Subscribers are notified asynchronously. When an archive is configured the
    /// message is handed to it on a background task; archive failures are logged
    /// and never affect the result.
    #[instrument(skip(self, text), fields(room = %room, user = %user))]
    pub fn append(&self, room: &RoomName, user: &UserName, text: &str) -> CoreResult<Message> {
        self.ensure_running()?;
        let message = self.store.append(room, user, text)?;

        if let Some(archive) = &self.archive {
            let archive = archive.clone();
            let archived = message.clone();
            self.runtime.spawn(async move {
                if let Err(e) = archive.persist(&archived).await {
                    tracing::warn!(
                        room = %archived.room,
                        message_id = %archived.id,
                        error = %e,
                        "Failed to archive message"
                    );
                }
            });
        }

        Ok(message)
    }

    /// Mark `user` as typing in `room`, or clear the mark.
    ///
    /// A typing mark expires after the configured TTL unless refreshed.
    #[instrument(skip(self), fields(room = %room, user = %user))]
    pub fn set_typing(&self, room: &RoomName, user: &UserName, is_typing: bool) -> CoreResult<()> {
        self.ensure_running()?;
        self.store.set_typing(room, user, is_typing);
        Ok(())
    }

    /// The last `limit` messages of `room`, oldest first
    pub fn get_recent(&self, room: &RoomName, limit: usize) -> Vec<Message> {
        self.store.get_recent(room, limit)
    }

    /// Users typing in `room`, excluding `requester`
    pub fn get_presence(&self, room: &RoomName, requester: &UserName) -> BTreeSet<UserName> {
        self.store.get_presence(room, requester)
    }

    /// Subscribe `client` to `room`, replacing the client's previous subscription
    #[instrument(skip(self, listener), fields(client_id = %client, room = %room))]
    pub fn subscribe(
        &self,
        client: ClientId,
        room: &RoomName,
        listener: Arc<dyn RoomListener>,
    ) -> CoreResult<SubscriptionHandle> {
        self.ensure_running()?;
        let handle = self.broker.subscribe(client, room, listener)?;

        // A shutdown that ran while registering has already swept the broker
        if self.is_shut_down() {
            self.broker.unsubscribe(&handle);
            return Err(DomainError::ShutDown);
        }
        Ok(handle)
    }

    /// End a subscription. Idempotent; returns whether this call ended it.
    #[instrument(skip(self), fields(subscription_id = %handle.id()))]
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        self.broker.unsubscribe(handle)
    }

    /// The client's active subscription, if any
    pub fn subscription_of(&self, client: ClientId) -> Option<SubscriptionHandle> {
        self.broker.subscription_of(client)
    }

    /// Observe the online state. The receiver holds the current value.
    pub fn connectivity(&self) -> watch::Receiver<Connectivity> {
        self.connectivity.subscribe()
    }

    /// Report a transport transition. Returns whether the state changed.
    pub fn set_online(&self, is_online: bool) -> bool {
        if self.is_shut_down() && is_online {
            return false;
        }
        self.connectivity.set_online(is_online)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Go offline, end every subscription, and cancel all typing expiry.
    ///
    /// Later mutations and subscriptions fail with `ShutDown`. Calling it again is
    /// a no-op.
    #[instrument(skip(self))]
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }

        self.connectivity.set_online(false);
        let ended = self.broker.unsubscribe_all();
        self.store.cancel_timers();

        info!(subscriptions = ended, rooms = self.store.room_count(), "Chat core shut down");
    }
}

impl Drop for ChatCore {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ChatCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCore")
            .field("store", &self.store)
            .field("broker", &self.broker)
            .field("connectivity", &self.connectivity.current())
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}
