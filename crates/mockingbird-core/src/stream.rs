//! Streaming subscriptions and synchronous broadcast.
//!
//! A subscription is registered with a fresh output channel and a
//! predicate per entity type. Broadcast happens synchronously when a
//! message or direct message is created: every open subscription whose
//! predicate for that entity type exists and accepts the raw entity gets
//! the entity rendered with default options and appended to its channel
//! as one CRLF-terminated JSON record.
//!
//! The channel is a buffering append, never a blocking write. A channel
//! that has signaled disconnect stops receiving and is reaped from the
//! registry on the next broadcast pass; closing during an in-flight
//! broadcast iteration is safe, and a record already appended stays
//! delivered.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::entity::{DirectMessage, Message};
use crate::error::ServiceError;
use crate::store::EntityStore;
use crate::wire::{DmRenderOptions, MessageRenderOptions, render_dm, render_message};

/// Identifier of an open subscription, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
struct ChannelInner {
    records: Vec<String>,
    disconnected: bool,
}

/// Buffering output channel of one subscription.
///
/// Cloning shares the buffer, so the handle returned to a test and the
/// registry's copy observe the same records and the same disconnect flag.
#[derive(Debug, Clone, Default)]
pub struct StreamChannel {
    inner: Arc<Mutex<ChannelInner>>,
}

impl StreamChannel {
    /// Create an empty, connected channel.
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::expect_used)]
    fn lock(&self) -> std::sync::MutexGuard<'_, ChannelInner> {
        // Panicking on a poisoned mutex is acceptable in test-double code.
        self.inner.lock().expect("stream channel mutex poisoned")
    }

    /// Append one CRLF-terminated JSON record.
    ///
    /// Dropped silently if the channel has disconnected.
    pub fn push_record(&self, record: Map<String, Value>) {
        let mut inner = self.lock();
        if inner.disconnected {
            return;
        }
        let mut line = Value::Object(record).to_string();
        line.push_str("\r\n");
        inner.records.push(line);
    }

    /// All records delivered so far, in delivery order.
    pub fn records(&self) -> Vec<String> {
        self.lock().records.clone()
    }

    /// Take and clear the delivered records.
    pub fn drain_records(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().records)
    }

    /// Signal completion/disconnect. Idempotent; no further records are
    /// accepted after this returns.
    pub fn disconnect(&self) {
        self.lock().disconnected = true;
    }

    /// Whether the channel has signaled disconnect.
    pub fn is_disconnected(&self) -> bool {
        self.lock().disconnected
    }
}

type MessagePredicate = Box<dyn Fn(&Message) -> bool + Send>;
type DmPredicate = Box<dyn Fn(&DirectMessage) -> bool + Send>;

struct Subscription {
    channel: StreamChannel,
    message: Option<MessagePredicate>,
    dm: Option<DmPredicate>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("message", &self.message.as_ref().map(|_| "<predicate>"))
            .field("dm", &self.dm.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

/// Registry of open streaming subscriptions.
///
/// Subscriptions are delivered to in registration order. A subscription
/// has exactly two states: open (registered, eligible for delivery) and
/// closed (removed, terminal); there is no reopening.
#[derive(Debug, Default)]
pub struct StreamRegistry {
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    next_id: u64,
}

impl StreamRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscription with a fresh channel and no
    /// predicates.
    pub fn open(&mut self) -> (SubscriptionId, StreamChannel) {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let channel = StreamChannel::new();
        self.subscriptions
            .insert(id, Subscription { channel: channel.clone(), message: None, dm: None });
        tracing::debug!(%id, "subscription opened");
        (id, channel)
    }

    /// The channel of an open subscription.
    pub fn channel(&self, id: SubscriptionId) -> Option<StreamChannel> {
        self.subscriptions.get(&id).map(|sub| sub.channel.clone())
    }

    /// Attach the message predicate. No-op if the subscription closed.
    pub fn set_message_predicate(
        &mut self,
        id: SubscriptionId,
        predicate: impl Fn(&Message) -> bool + Send + 'static,
    ) {
        if let Some(sub) = self.subscriptions.get_mut(&id) {
            sub.message = Some(Box::new(predicate));
        }
    }

    /// Attach the direct-message predicate. No-op if the subscription
    /// closed.
    pub fn set_dm_predicate(
        &mut self,
        id: SubscriptionId,
        predicate: impl Fn(&DirectMessage) -> bool + Send + 'static,
    ) {
        if let Some(sub) = self.subscriptions.get_mut(&id) {
            sub.dm = Some(Box::new(predicate));
        }
    }

    /// Close a subscription. Idempotent; a closed subscription simply
    /// stops receiving further deliveries.
    pub fn close(&mut self, id: SubscriptionId) {
        if self.subscriptions.remove(&id).is_some() {
            tracing::debug!(%id, "subscription closed");
        }
    }

    /// Whether the subscription is still registered.
    pub fn is_open(&self, id: SubscriptionId) -> bool {
        self.subscriptions.contains_key(&id)
    }

    /// Number of open subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no subscriptions are open.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Deliver a newly created message to every matching subscription.
    ///
    /// Iterates a snapshot of the registration order, so a subscription
    /// closed mid-broadcast (including from its own channel's disconnect)
    /// does not corrupt the iteration.
    pub fn broadcast_message(
        &mut self,
        store: &EntityStore,
        message: &Message,
    ) -> Result<(), ServiceError> {
        let ids: Vec<SubscriptionId> = self.subscriptions.keys().copied().collect();
        for id in ids {
            if self.reap_if_disconnected(id) {
                continue;
            }
            let Some(sub) = self.subscriptions.get(&id) else { continue };
            let accepted = sub.message.as_ref().is_some_and(|predicate| predicate(message));
            if accepted {
                let record = render_message(message, store, &MessageRenderOptions::default())?;
                tracing::debug!(subscription = %id, message = %message.id, "delivering message");
                sub.channel.push_record(record);
            }
        }
        Ok(())
    }

    /// Deliver a newly created direct message to every matching
    /// subscription.
    pub fn broadcast_dm(
        &mut self,
        store: &EntityStore,
        dm: &DirectMessage,
    ) -> Result<(), ServiceError> {
        let ids: Vec<SubscriptionId> = self.subscriptions.keys().copied().collect();
        for id in ids {
            if self.reap_if_disconnected(id) {
                continue;
            }
            let Some(sub) = self.subscriptions.get(&id) else { continue };
            let accepted = sub.dm.as_ref().is_some_and(|predicate| predicate(dm));
            if accepted {
                let record = render_dm(dm, store, &DmRenderOptions::default())?;
                tracing::debug!(subscription = %id, dm = %dm.id, "delivering dm");
                sub.channel.push_record(record);
            }
        }
        Ok(())
    }

    /// Remove the subscription if its channel signaled disconnect.
    fn reap_if_disconnected(&mut self, id: SubscriptionId) -> bool {
        let disconnected =
            self.subscriptions.get(&id).is_some_and(|sub| sub.channel.is_disconnected());
        if disconnected {
            tracing::debug!(%id, "reaping disconnected subscription");
            self.subscriptions.remove(&id);
        }
        disconnected
    }
}
