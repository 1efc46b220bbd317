//! In-memory simulation engine for a social publishing service.
//!
//! A test double: client code can be exercised against this crate without
//! a network dependency. It models the persistent entities (users, short
//! messages, direct messages), reproduces the real service's wire
//! mappings and feed-filtering semantics, and delivers newly created
//! entities to long-lived streaming subscriptions synchronously on write.
//!
//! # Architecture
//!
//! ```text
//! Service
//!   ├── EntityStore        entities + deterministic id allocation
//!   └── StreamRegistry     subscriptions, predicates, broadcast
//!
//! read path:   store lookups → timeline::filter_timeline → wire::render_*
//! write path:  Service::add_message → StreamRegistry::broadcast → wire
//! ```
//!
//! The request surface (endpoint table, parameter handling, dispatch)
//! lives in the companion `mockingbird-api` crate; this crate is pure
//! logic with no I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod entity;
pub mod error;
pub mod mention;
pub mod service;
pub mod store;
pub mod stream;
pub mod timeline;
pub mod wire;

pub use entity::{DirectMessage, DmId, EntityKind, Extras, Message, MessageId, User, UserId};
pub use error::ServiceError;
pub use mention::{Mention, extract_mentions, leading_mention};
pub use service::Service;
pub use store::EntityStore;
pub use stream::{StreamChannel, StreamRegistry, SubscriptionId};
pub use timeline::{DEFAULT_COUNT, FeedItem, MAX_COUNT, TimelineQuery, filter_timeline};
pub use wire::{DmRenderOptions, MessageRenderOptions, render_dm, render_message, render_user};
