//! # Subscription Registry
//!
//! Maps a (message type, topic-or-none) key to the handler callbacks
//! registered under it. All mutation and snapshotting happens under one
//! coarse lock; the lock is never held across a handler invocation or an
//! encode/decode call.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use mq_types::HandlerResult;

/// Type-erased delivery callback.
///
/// Receives the JSON payload of one envelope and decodes its own fresh
/// message instance, so concurrent registrations never share a decoded
/// message.
pub(crate) type DeliveryFn =
    Arc<dyn Fn(Arc<str>, CancellationToken) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Routing key: message type identity plus optional topic.
///
/// A structural composite key — two keys are equal iff both components
/// match. The topic is case-sensitive, and `None` is distinct from every
/// `Some(topic)`; empty topics are rejected at the media boundary and never
/// reach a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    type_id: TypeId,
    topic: Option<String>,
}

impl SubscriptionKey {
    /// Key for topic-less routing of a message type.
    pub fn topicless(type_id: TypeId) -> Self {
        Self {
            type_id,
            topic: None,
        }
    }

    /// Key for routing of a message type under an exact topic.
    pub fn with_topic(type_id: TypeId, topic: impl Into<String>) -> Self {
        Self {
            type_id,
            topic: Some(topic.into()),
        }
    }

    /// The topic component, if any.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }
}

/// The callbacks registered under one key, in registration order.
///
/// Created lazily on first registration for the key and kept even when its
/// callback list empties, so a later re-subscription to the same key reuses
/// it.
struct MediaSubscription {
    message_type: &'static str,
    handlers: Vec<(Uuid, DeliveryFn)>,
}

impl MediaSubscription {
    fn new(message_type: &'static str) -> Self {
        Self {
            message_type,
            handlers: Vec::new(),
        }
    }

    fn add(&mut self, handler: DeliveryFn) -> Uuid {
        let id = Uuid::new_v4();
        self.handlers.push((id, handler));
        id
    }

    fn remove(&mut self, id: Uuid) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    fn snapshot(&self) -> Vec<DeliveryFn> {
        self.handlers
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect()
    }
}

/// Registry of all media subscriptions, guarded by a single lock.
pub(crate) struct SubscriptionRegistry {
    inner: Mutex<HashMap<SubscriptionKey, MediaSubscription>>,
}

impl SubscriptionRegistry {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Appends `handler` under `key`, creating the subscription on first
    /// registration. Returns the registration id the handle disposes with.
    pub(crate) fn register(
        &self,
        key: SubscriptionKey,
        message_type: &'static str,
        handler: DeliveryFn,
    ) -> Uuid {
        let mut inner = self.inner.lock();
        inner
            .entry(key)
            .or_insert_with(|| MediaSubscription::new(message_type))
            .add(handler)
    }

    /// Removes the callback registered under `(key, id)`. No-op when the
    /// key or id is unknown, which makes handle disposal idempotent.
    pub(crate) fn unregister(&self, key: &SubscriptionKey, id: Uuid) {
        let mut inner = self.inner.lock();
        if let Some(subscription) = inner.get_mut(key) {
            subscription.remove(id);
        }
    }

    /// A copy of the current callback list for `key`, in registration
    /// order; empty if none registered. Safe to iterate after the lock is
    /// released — concurrent registration or unregistration cannot mutate
    /// a list being dispatched.
    pub(crate) fn snapshot(&self, key: &SubscriptionKey) -> Vec<DeliveryFn> {
        let inner = self.inner.lock();
        inner
            .get(key)
            .map(MediaSubscription::snapshot)
            .unwrap_or_default()
    }

    /// The message type name recorded for `key`, for logs.
    #[allow(dead_code)]
    pub(crate) fn message_type(&self, key: &SubscriptionKey) -> Option<&'static str> {
        let inner = self.inner.lock();
        inner.get(key).map(|subscription| subscription.message_type)
    }
}
