//! # Message Subscriber
//!
//! Collects handler registrations into bundles while idle, validates them
//! (style exclusivity and duplication per exact key), registers every
//! bundle with the media on start, and cancels in-flight invocations and
//! unregisters on stop or dispose.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use mq_media::{InMemoryMedia, SubscriptionHandle};
use mq_types::{Lifecycle, LifecycleState, StateError};

use crate::bundle::Bundle;
use crate::context::HandlerContextFactory;
use crate::descriptor::HandlerDescriptor;
use crate::error::{StartError, SubscribeError};
use crate::handler::DispatchStyle;

/// Introspection record for one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInfo {
    pub message_type: &'static str,
    pub topic: Option<String>,
    pub style: DispatchStyle,
    /// Handler type names, in registration order.
    pub handler_types: Vec<&'static str>,
}

/// The consumer-side subscription state machine.
///
/// ```text
/// Idle ──start──> Running ──stop──> Stopped ──start──> Running ...
///   │  subscribe     │                 │
///   └────────────────┴────dispose──────┴──> Disposed
/// ```
///
/// `subscribe` is legal only while `Idle`; the bundle set is frozen once
/// started. `stop` cancels in-flight handler invocations and unregisters
/// every bundle; `start` from `Stopped` registers them again.
pub struct MessageSubscriber {
    media: InMemoryMedia,
    factory: Arc<dyn HandlerContextFactory>,
    lifecycle: Lifecycle,
    bundles: Vec<Bundle>,
    handles: Vec<SubscriptionHandle>,
    cancel: Option<CancellationToken>,
}

impl MessageSubscriber {
    pub fn new(media: InMemoryMedia, factory: Arc<dyn HandlerContextFactory>) -> Self {
        Self {
            media,
            factory,
            lifecycle: Lifecycle::new("message-subscriber"),
            bundles: Vec::new(),
            handles: Vec::new(),
            cancel: None,
        }
    }

    /// Instance name, readable in every state.
    pub fn name(&self) -> &str {
        self.lifecycle.name()
    }

    /// Renames the instance. Rejected once disposed.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), StateError> {
        self.lifecycle.set_name(name)
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }

    /// Registers a handler for topic-less routing of its message type.
    pub fn subscribe(&mut self, descriptor: HandlerDescriptor) -> Result<(), SubscribeError> {
        self.subscribe_impl(descriptor, None)
    }

    /// Registers a handler for its message type under an exact topic.
    pub fn subscribe_with_topic(
        &mut self,
        descriptor: HandlerDescriptor,
        topic: &str,
    ) -> Result<(), SubscribeError> {
        if topic.is_empty() {
            return Err(SubscribeError::EmptyTopic);
        }
        self.subscribe_impl(descriptor, Some(topic.to_string()))
    }

    fn subscribe_impl(
        &mut self,
        descriptor: HandlerDescriptor,
        topic: Option<String>,
    ) -> Result<(), SubscribeError> {
        self.lifecycle.require("subscribe", &[LifecycleState::Idle])?;

        let position = self
            .bundles
            .iter()
            .position(|bundle| bundle.matches(descriptor.message_type, topic.as_deref()));
        match position {
            Some(index) => self.bundles[index].admit(descriptor)?,
            None => {
                debug!(
                    handler = descriptor.handler_type_name,
                    message_type = descriptor.message_type_name,
                    topic = topic.as_deref().unwrap_or("<none>"),
                    "bundle created"
                );
                self.bundles.push(Bundle::new(topic, descriptor));
            }
        }
        Ok(())
    }

    /// Freezes the bundle set and registers every bundle with the media.
    ///
    /// All-or-nothing: if the media rejects a bundle, registrations made so
    /// far are disposed and the subscriber stays startable.
    pub fn start(&mut self) -> Result<(), StartError> {
        self.lifecycle
            .require("start", &[LifecycleState::Idle, LifecycleState::Stopped])?;

        let cancel = CancellationToken::new();
        let mut handles = Vec::with_capacity(self.bundles.len());
        for bundle in &self.bundles {
            match bundle.register(&self.media, self.factory.clone(), cancel.clone()) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    for handle in &handles {
                        handle.dispose();
                    }
                    return Err(err.into());
                }
            }
        }

        self.handles = handles;
        self.cancel = Some(cancel);
        self.lifecycle.start()?;
        debug!(
            subscriber = self.lifecycle.name(),
            bundles = self.bundles.len(),
            "subscriber started"
        );
        Ok(())
    }

    /// Cancels in-flight handler invocations and unregisters every bundle.
    pub fn stop(&mut self) -> Result<(), StateError> {
        self.lifecycle.stop()?;
        self.release_registrations();
        debug!(subscriber = self.lifecycle.name(), "subscriber stopped");
        Ok(())
    }

    /// Terminal teardown; legal from any state and idempotent.
    pub fn dispose(&mut self) {
        if !self.lifecycle.dispose() {
            return;
        }
        self.release_registrations();
        self.bundles.clear();
        debug!(subscriber = self.lifecycle.name(), "subscriber disposed");
    }

    /// One record per bundle, in creation order. Empty once disposed.
    pub fn subscriptions(&self) -> Vec<SubscriptionInfo> {
        self.bundles.iter().map(Bundle::info).collect()
    }

    fn release_registrations(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        for handle in self.handles.drain(..) {
            handle.dispose();
        }
    }
}

impl Drop for MessageSubscriber {
    fn drop(&mut self) {
        self.dispose();
    }
}
