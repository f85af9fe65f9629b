//! Chat client session
//!
//! Keeps one participant's state together: client id, display name, current room,
//! and that room's subscription. The operations mirror what a chat widget does on
//! room switches, sends, input changes, and renames.

use crate::engine::ChatCore;
use crate::subscription::{RoomListener, SubscriptionHandle};
use chat_core::{ClientId, CoreResult, DomainError, Message, RoomName, UserName};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A participant's session against a `ChatCore`
pub struct ChatClient {
    core: Arc<ChatCore>,
    id: ClientId,
    user: UserName,
    room: Option<RoomName>,
    subscription: Option<SubscriptionHandle>,
}

impl ChatClient {
    /// Create a session for `user`, not yet in any room
    pub fn new(core: Arc<ChatCore>, user: UserName) -> Self {
        Self {
            core,
            id: ClientId::generate(),
            user,
            room: None,
            subscription: None,
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn user(&self) -> &UserName {
        &self.user
    }

    /// Room currently joined
    pub fn room(&self) -> Option<&RoomName> {
        self.room.as_ref()
    }

    pub fn subscription(&self) -> Option<&SubscriptionHandle> {
        self.subscription.as_ref()
    }

    fn current_room(&self) -> CoreResult<&RoomName> {
        self.room
            .as_ref()
            .ok_or_else(|| DomainError::ValidationError("no room joined".to_string()))
    }

    fn is_in(&self, room: &RoomName) -> bool {
        self.room.as_ref() == Some(room)
            && self
                .subscription
                .as_ref()
                .is_some_and(SubscriptionHandle::is_active)
    }

    /// Move to `room`.
    ///
    /// A no-op returning `false` when already subscribed there. Otherwise clears
    /// this user's typing mark in the old room, then subscribes `listener`, which
    /// replaces the old subscription.
    pub fn switch_room(
        &mut self,
        room: RoomName,
        listener: Arc<dyn RoomListener>,
    ) -> CoreResult<bool> {
        if self.is_in(&room) {
            return Ok(false);
        }

        if let Some(previous) = &self.room {
            self.core.set_typing(previous, &self.user, false)?;
        }

        let handle = self.core.subscribe(self.id, &room, listener)?;
        tracing::debug!(client_id = %self.id, user = %self.user, room = %room, "Switched room");

        self.room = Some(room);
        self.subscription = Some(handle);
        Ok(true)
    }

    /// Send `text` to the current room, then clear this user's typing mark
    pub fn send(&self, text: &str) -> CoreResult<Message> {
        let room = self.current_room()?;
        let message = self.core.append(room, &self.user, text)?;
        self.core.set_typing(room, &self.user, false)?;
        Ok(message)
    }

    /// Report the input box contents: non-empty text is a typing heartbeat
    pub fn input_changed(&self, text: &str) -> CoreResult<()> {
        let room = self.current_room()?;
        self.core.set_typing(room, &self.user, !text.is_empty())
    }

    /// Change display name; blank input picks a random `User-N` name.
    ///
    /// The typing mark under the old name is cleared first.
    pub fn rename(&mut self, name: &str) -> CoreResult<&UserName> {
        let user = UserName::or_random(name)?;
        if let Some(room) = &self.room {
            self.core.set_typing(room, &self.user, false)?;
        }
        self.user = user;
        Ok(&self.user)
    }

    /// Users typing in the current room other than this one
    pub fn typing_others(&self) -> BTreeSet<UserName> {
        self.room
            .as_ref()
            .map(|room| self.core.get_presence(room, &self.user))
            .unwrap_or_default()
    }

    /// Clear typing and end the subscription
    pub fn leave(&mut self) -> CoreResult<()> {
        if let Some(room) = self.room.take() {
            if !self.core.is_shut_down() {
                self.core.set_typing(&room, &self.user, false)?;
            }
        }
        if let Some(handle) = self.subscription.take() {
            self.core.unsubscribe(&handle);
        }
        Ok(())
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("id", &self.id)
            .field("user", &self.user)
            .field("room", &self.room)
            .field("subscription", &self.subscription.as_ref().map(SubscriptionHandle::id))
            .finish_non_exhaustive()
    }
}
