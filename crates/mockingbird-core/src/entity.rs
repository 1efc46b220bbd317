//! Entity model for the simulated publishing service.
//!
//! Identifiers are newtypes over `u64`: the decimal rendering is the
//! canonical wire string and the inner value is the wire integer, so the
//! `id == int(id_str)` invariant holds by construction. Ordering of
//! messages and direct messages is ordering of the inner value, which the
//! store's allocation scheme ties to creation order.
//!
//! Every entity carries an `extras` map. During wire rendering the map is
//! merged over the computed result last, so test setup can override any
//! computed or default field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Per-entity override map, merged last during wire rendering.
pub type Extras = Map<String, Value>;

/// Wire timestamp format (e.g. `Wed Aug 27 13:08:45 +0000 2008`).
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Render a creation timestamp in the service's wire format.
pub fn format_created_at(created_at: DateTime<Utc>) -> String {
    created_at.format(CREATED_AT_FORMAT).to_string()
}

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            /// The integer wire form.
            pub fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`User`].
    UserId
);
entity_id!(
    /// Identifier of a [`Message`].
    MessageId
);
entity_id!(
    /// Identifier of a [`DirectMessage`].
    DmId
);

/// Kind tag for entities, used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A registered account.
    User,
    /// A short public post.
    Message,
    /// A private message between two users.
    DirectMessage,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Message => write!(f, "message"),
            Self::DirectMessage => write!(f, "direct message"),
        }
    }
}

/// A registered account.
///
/// `screen_name` is unique in practice but the store does not enforce it;
/// screen-name lookups return the first match.
#[derive(Debug, Clone)]
pub struct User {
    /// Identifier.
    pub id: UserId,
    /// Handle used in `@mention` syntax. Case sensitive.
    pub screen_name: String,
    /// Display name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Override fields merged last during rendering.
    pub extras: Extras,
}

impl User {
    /// Create a user stamped with the current time and no overrides.
    pub fn new(id: UserId, screen_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            screen_name: screen_name.into(),
            name: name.into(),
            created_at: Utc::now(),
            extras: Extras::new(),
        }
    }

    /// Add a wire-field override.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }
}

/// A short public post (tweet-equivalent).
#[derive(Debug, Clone)]
pub struct Message {
    /// Identifier; numeric value is the feed ordering key.
    pub id: MessageId,
    /// Body text.
    pub text: String,
    /// Author identifier.
    pub author: UserId,
    /// Message this one replies to, if any. Not checked on deletion of the
    /// target; a dangling reference is allowed.
    pub reply_to: Option<MessageId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Override fields merged last during rendering.
    pub extras: Extras,
}

impl Message {
    /// Create a message stamped with the current time, no reply target and
    /// no overrides.
    pub fn new(id: MessageId, text: impl Into<String>, author: UserId) -> Self {
        Self {
            id,
            text: text.into(),
            author,
            reply_to: None,
            created_at: Utc::now(),
            extras: Extras::new(),
        }
    }

    /// Set the reply target.
    pub fn in_reply_to(mut self, target: MessageId) -> Self {
        self.reply_to = Some(target);
        self
    }

    /// Add a wire-field override.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }
}

/// A private message between a sender and a recipient.
#[derive(Debug, Clone)]
pub struct DirectMessage {
    /// Identifier; numeric value is the feed ordering key.
    pub id: DmId,
    /// Body text.
    pub text: String,
    /// Sender identifier.
    pub sender: UserId,
    /// Recipient identifier.
    pub recipient: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Override fields merged last during rendering.
    pub extras: Extras,
}

impl DirectMessage {
    /// Create a direct message stamped with the current time and no
    /// overrides.
    pub fn new(id: DmId, text: impl Into<String>, sender: UserId, recipient: UserId) -> Self {
        Self {
            id,
            text: text.into(),
            sender,
            recipient,
            created_at: Utc::now(),
            extras: Extras::new(),
        }
    }

    /// Add a wire-field override.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }
}
