//! The composed simulation: entity store plus stream registry.
//!
//! All entity creation goes through this type. The `new_*` factories
//! allocate the next identifier for the kind and delegate to the `add_*`
//! insertion path; inserting a message or direct message broadcasts it to
//! matching subscriptions synchronously, before the factory returns, so a
//! write followed immediately by a read of the subscription channel is
//! deterministic.
//!
//! `Service` is single-threaded (`&mut self`). Callers with genuinely
//! concurrent clients wrap the whole value in one mutex; request handling
//! is short and never blocks, so finer-grained locking buys nothing.

use crate::entity::{DirectMessage, DmId, Message, MessageId, User, UserId};
use crate::error::ServiceError;
use crate::store::EntityStore;
use crate::stream::StreamRegistry;

/// In-memory simulation of the publishing service.
#[derive(Debug, Default)]
pub struct Service {
    store: EntityStore,
    streams: StreamRegistry,
}

impl Service {
    /// Create an empty simulation.
    pub fn new() -> Self {
        Self::default()
    }

    /// The entity store.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Mutable access to the entity store.
    ///
    /// Inserting messages directly through the store skips broadcast; use
    /// [`Service::add_message`] unless that is what you want.
    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    /// The stream registry.
    pub fn streams(&self) -> &StreamRegistry {
        &self.streams
    }

    /// Mutable access to the stream registry.
    pub fn streams_mut(&mut self) -> &mut StreamRegistry {
        &mut self.streams
    }

    /// Insert a fully-formed user under its own identifier.
    pub fn add_user(&mut self, user: User) -> UserId {
        self.store.add_user(user)
    }

    /// Insert a fully-formed message and broadcast it before returning.
    ///
    /// Fails only when a matching subscription's rendering does (for
    /// example the author is not registered); the message is stored
    /// either way.
    pub fn add_message(&mut self, message: Message) -> Result<MessageId, ServiceError> {
        let id = self.store.add_message(message);
        let message = self
            .store
            .message(id)
            .ok_or_else(|| ServiceError::not_found(crate::entity::EntityKind::Message, id))?;
        self.streams.broadcast_message(&self.store, message)?;
        Ok(id)
    }

    /// Insert a fully-formed direct message and broadcast it before
    /// returning.
    pub fn add_dm(&mut self, dm: DirectMessage) -> Result<DmId, ServiceError> {
        let id = self.store.add_dm(dm);
        let dm = self
            .store
            .dm(id)
            .ok_or_else(|| ServiceError::not_found(crate::entity::EntityKind::DirectMessage, id))?;
        self.streams.broadcast_dm(&self.store, dm)?;
        Ok(id)
    }

    /// Register a user under the next allocated identifier.
    pub fn new_user(&mut self, screen_name: impl Into<String>, name: impl Into<String>) -> UserId {
        let id = self.store.allocate_user_id();
        self.add_user(User::new(id, screen_name, name))
    }

    /// Create a message under the next allocated identifier and broadcast
    /// it.
    pub fn new_message(
        &mut self,
        text: impl Into<String>,
        author: UserId,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, ServiceError> {
        let id = self.store.allocate_message_id();
        let mut message = Message::new(id, text, author);
        message.reply_to = reply_to;
        self.add_message(message)
    }

    /// Create a direct message under the next allocated identifier and
    /// broadcast it.
    pub fn new_dm(
        &mut self,
        text: impl Into<String>,
        sender: UserId,
        recipient: UserId,
    ) -> Result<DmId, ServiceError> {
        let id = self.store.allocate_dm_id();
        self.add_dm(DirectMessage::new(id, text, sender, recipient))
    }
}
