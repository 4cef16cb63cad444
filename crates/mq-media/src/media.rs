//! # In-Memory Media
//!
//! Orchestrates publish (validate, encode, enqueue), subscribe/unsubscribe
//! (registry mutation) and dispatch (dequeue, decode per delivery, invoke,
//! isolate failures).

use std::any::{type_name, TypeId};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use mq_types::{HandlerError, HandlerResult, Message, QueueWorker, TransportEnvelope};

use crate::error::{PublishError, SubscribeError};
use crate::handle::SubscriptionHandle;
use crate::registry::{DeliveryFn, SubscriptionKey, SubscriptionRegistry};

/// The in-memory broker.
///
/// One dispatch worker per instance drains the queue strictly in publish
/// order; all deliveries for one envelope settle before the next envelope
/// is taken, so handler executions across envelopes never interleave.
///
/// Cloning shares the same broker.
#[derive(Clone)]
pub struct InMemoryMedia {
    inner: Arc<MediaInner>,
}

struct MediaInner {
    registry: Arc<SubscriptionRegistry>,
    queue: QueueWorker<TransportEnvelope>,
    disposed: AtomicBool,
}

impl InMemoryMedia {
    /// Creates the media and starts its dispatch worker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new() -> Self {
        let registry = Arc::new(SubscriptionRegistry::new());
        let inner = Arc::new_cyclic(|weak: &Weak<MediaInner>| {
            let weak = weak.clone();
            let queue = QueueWorker::spawn("media-dispatch", move |envelope, cancel| {
                let weak = weak.clone();
                async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.dispatch(envelope, cancel).await;
                    }
                }
            });
            MediaInner {
                registry,
                queue,
                disposed: AtomicBool::new(false),
            }
        });
        Self { inner }
    }

    /// Publishes a message.
    ///
    /// The message is encoded synchronously — an encoding failure surfaces
    /// here, attributable to this exact call — then queued for asynchronous
    /// delivery. The topic travels on the message itself
    /// ([`Message::topic`]); an explicit empty topic is an argument error.
    pub fn publish<M: Message>(&self, message: &M) -> Result<(), PublishError> {
        if self.is_disposed() {
            return Err(PublishError::Disposed);
        }

        let topic = match message.topic() {
            Some("") => return Err(PublishError::EmptyTopic),
            Some(topic) => Some(topic.to_string()),
            None => None,
        };

        let payload = serde_json::to_string(message).map_err(|source| PublishError::Encode {
            message_type: type_name::<M>(),
            source,
        })?;

        let envelope = TransportEnvelope {
            type_id: TypeId::of::<M>(),
            type_name: type_name::<M>(),
            payload,
            topic,
        };
        debug!(
            message_type = envelope.type_name,
            topic = envelope.topic.as_deref().unwrap_or("<none>"),
            "message published"
        );
        self.inner
            .queue
            .enqueue(envelope)
            .map_err(|_| PublishError::Disposed)
    }

    /// Registers a topic-less delivery callback for `M`.
    ///
    /// Topic-less callbacks receive every message of the type, with and
    /// without a topic. The callback gets a freshly decoded message
    /// instance per delivery, plus a cancellation token derived from the
    /// dispatch worker's.
    pub fn subscribe<M, F, Fut>(&self, handler: F) -> Result<SubscriptionHandle, SubscribeError>
    where
        M: Message,
        F: Fn(M, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.subscribe_impl(None, handler)
    }

    /// Registers a delivery callback for `M` under an exact topic.
    ///
    /// Topic-bound callbacks receive only messages published with that
    /// exact (case-sensitive) topic.
    pub fn subscribe_with_topic<M, F, Fut>(
        &self,
        topic: &str,
        handler: F,
    ) -> Result<SubscriptionHandle, SubscribeError>
    where
        M: Message,
        F: Fn(M, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        if topic.is_empty() {
            return Err(SubscribeError::EmptyTopic);
        }
        self.subscribe_impl(Some(topic.to_string()), handler)
    }

    fn subscribe_impl<M, F, Fut>(
        &self,
        topic: Option<String>,
        handler: F,
    ) -> Result<SubscriptionHandle, SubscribeError>
    where
        M: Message,
        F: Fn(M, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        if self.is_disposed() {
            return Err(SubscribeError::Disposed);
        }

        let key = match topic {
            Some(topic) => SubscriptionKey::with_topic(TypeId::of::<M>(), topic),
            None => SubscriptionKey::topicless(TypeId::of::<M>()),
        };

        let handler = Arc::new(handler);
        let delivery: DeliveryFn = Arc::new(move |payload: Arc<str>, cancel: CancellationToken| {
            let handler = handler.clone();
            Box::pin(async move {
                // Fresh instance per delivery, decoded from the stored
                // encoding; decode failures are this callback's own outcome.
                let message: M = serde_json::from_str(&payload).map_err(|err| {
                    HandlerError::failed(format!(
                        "failed to decode message of type '{}': {err}",
                        type_name::<M>()
                    ))
                })?;
                handler(message, cancel).await
            })
        });

        let id = self
            .inner
            .registry
            .register(key.clone(), type_name::<M>(), delivery);
        debug!(
            message_type = type_name::<M>(),
            topic = key.topic().unwrap_or("<none>"),
            "delivery callback registered"
        );
        Ok(SubscriptionHandle::new(
            Arc::downgrade(&self.inner.registry),
            key,
            id,
        ))
    }

    /// Stops the dispatch worker and rejects all further operations.
    ///
    /// Envelopes still queued are abandoned, not drained. Idempotent.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.queue.shutdown();
        debug!("media disposed");
    }

    /// Whether `dispose` has been called.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaInner {
    /// Delivers one envelope: topic-less list first, then the topic list.
    ///
    /// Every callback failure is caught here, logged, and never suppresses
    /// the remaining callbacks in either list.
    async fn dispatch(&self, envelope: TransportEnvelope, cancel: CancellationToken) {
        let mut lists = Vec::with_capacity(2);
        lists.push(
            self.registry
                .snapshot(&SubscriptionKey::topicless(envelope.type_id)),
        );
        if let Some(topic) = &envelope.topic {
            lists.push(
                self.registry
                    .snapshot(&SubscriptionKey::with_topic(envelope.type_id, topic.clone())),
            );
        }

        let payload: Arc<str> = Arc::from(envelope.payload.as_str());
        let topic = envelope.topic.as_deref().unwrap_or("<none>");
        for handlers in lists {
            for handler in handlers {
                match handler(payload.clone(), cancel.clone()).await {
                    Ok(()) => {
                        debug!(
                            message_type = envelope.type_name,
                            topic, "handler completed"
                        );
                    }
                    Err(err) if err.is_cancelled() => {
                        warn!(
                            message_type = envelope.type_name,
                            topic, "handler invocation was cancelled"
                        );
                    }
                    Err(err) => {
                        error!(
                            message_type = envelope.type_name,
                            topic,
                            error = %err,
                            "handler failed"
                        );
                    }
                }
            }
        }
    }
}
