//! Entity storage with deterministic identifier allocation.
//!
//! `EntityStore` owns the three entity maps and one allocation counter per
//! entity kind. Counters start at 1000 and advance by 10 per allocation,
//! so identifier order is creation order and tests can predict ids.
//!
//! Storage iteration order is unordered; any feed ordering comes from the
//! timeline filter's explicit sort, never from map iteration. The store is
//! pure state: broadcast-on-write is composed a layer up in
//! [`Service`](crate::service::Service).

use std::collections::HashMap;

use crate::entity::{DirectMessage, DmId, EntityKind, Message, MessageId, User, UserId};
use crate::error::ServiceError;

/// First identifier handed out by each allocation counter.
pub const FIRST_ID: u64 = 1000;

/// Counter step per allocation.
pub const ID_STEP: u64 = 10;

/// In-memory store for users, messages and direct messages.
#[derive(Debug)]
pub struct EntityStore {
    users: HashMap<UserId, User>,
    messages: HashMap<MessageId, Message>,
    dms: HashMap<DmId, DirectMessage>,
    next_user_id: u64,
    next_message_id: u64,
    next_dm_id: u64,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Create an empty store with all counters at [`FIRST_ID`].
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            messages: HashMap::new(),
            dms: HashMap::new(),
            next_user_id: FIRST_ID,
            next_message_id: FIRST_ID,
            next_dm_id: FIRST_ID,
        }
    }

    /// Allocate the next user identifier and advance the counter.
    pub fn allocate_user_id(&mut self) -> UserId {
        let id = UserId(self.next_user_id);
        self.next_user_id += ID_STEP;
        id
    }

    /// Allocate the next message identifier and advance the counter.
    pub fn allocate_message_id(&mut self) -> MessageId {
        let id = MessageId(self.next_message_id);
        self.next_message_id += ID_STEP;
        id
    }

    /// Allocate the next direct-message identifier and advance the counter.
    pub fn allocate_dm_id(&mut self) -> DmId {
        let id = DmId(self.next_dm_id);
        self.next_dm_id += ID_STEP;
        id
    }

    /// Insert a fully-formed user under its own identifier.
    ///
    /// An existing user with the same identifier is replaced.
    pub fn add_user(&mut self, user: User) -> UserId {
        let id = user.id;
        tracing::debug!(%id, screen_name = %user.screen_name, "user added");
        self.users.insert(id, user);
        id
    }

    /// Insert a fully-formed message under its own identifier.
    pub fn add_message(&mut self, message: Message) -> MessageId {
        let id = message.id;
        tracing::debug!(%id, author = %message.author, "message added");
        self.messages.insert(id, message);
        id
    }

    /// Insert a fully-formed direct message under its own identifier.
    pub fn add_dm(&mut self, dm: DirectMessage) -> DmId {
        let id = dm.id;
        tracing::debug!(%id, sender = %dm.sender, recipient = %dm.recipient, "dm added");
        self.dms.insert(id, dm);
        id
    }

    /// Look up a user. `None` if absent.
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Look up a message. `None` if absent.
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(&id)
    }

    /// Look up a direct message. `None` if absent.
    pub fn dm(&self, id: DmId) -> Option<&DirectMessage> {
        self.dms.get(&id)
    }

    /// Remove a user by identifier.
    ///
    /// Non-cascading: the user's messages and direct messages stay behind.
    pub fn remove_user(&mut self, id: UserId) -> Result<User, ServiceError> {
        tracing::debug!(%id, "user removed");
        self.users.remove(&id).ok_or_else(|| ServiceError::not_found(EntityKind::User, id))
    }

    /// Remove a message by identifier.
    ///
    /// Non-cascading: replies referencing it keep their now-dangling
    /// target.
    pub fn remove_message(&mut self, id: MessageId) -> Result<Message, ServiceError> {
        tracing::debug!(%id, "message removed");
        self.messages.remove(&id).ok_or_else(|| ServiceError::not_found(EntityKind::Message, id))
    }

    /// Remove a direct message by identifier.
    pub fn remove_dm(&mut self, id: DmId) -> Result<DirectMessage, ServiceError> {
        tracing::debug!(%id, "dm removed");
        self.dms
            .remove(&id)
            .ok_or_else(|| ServiceError::not_found(EntityKind::DirectMessage, id))
    }

    /// First user whose screen name matches exactly. Case sensitive,
    /// linear scan; `None` if no user matches.
    pub fn user_by_screen_name(&self, screen_name: &str) -> Option<&User> {
        self.users.values().find(|user| user.screen_name == screen_name)
    }

    /// All users, unordered.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// All messages, unordered.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    /// All direct messages, unordered.
    pub fn dms(&self) -> impl Iterator<Item = &DirectMessage> {
        self.dms.values()
    }

    /// Messages authored by the given user, unordered.
    pub fn messages_from(&self, author: UserId) -> impl Iterator<Item = &Message> {
        self.messages.values().filter(move |message| message.author == author)
    }

    /// Messages whose text contains the literal `@screen_name` of the
    /// given user, unordered.
    ///
    /// The match is a plain substring test, so `@alice` also matches
    /// inside `@alicederp`; resolved mention records come from the
    /// extraction pass at rendering time, not from this scan.
    pub fn messages_mentioning(
        &self,
        user_id: UserId,
    ) -> Result<impl Iterator<Item = &Message>, ServiceError> {
        let user = self
            .user(user_id)
            .ok_or_else(|| ServiceError::not_found(EntityKind::User, user_id))?;
        let needle = format!("@{}", user.screen_name);
        Ok(self.messages.values().filter(move |message| message.text.contains(&needle)))
    }
}
