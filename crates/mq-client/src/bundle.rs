//! # Bundles
//!
//! A bundle is the set of handler registrations sharing one
//! (message type, topic) key. Within a bundle all handlers share one
//! dispatch style and each handler type appears at most once; violations
//! are rejected at subscribe time with stable errors and no side effect.
//!
//! At subscriber start, each bundle is instantiated into a single media
//! delivery callback that runs the bundle's handlers in registration
//! order, each under its own handler context.

use std::any::{Any, TypeId};
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use mq_media::{InMemoryMedia, SubscriptionHandle};
use mq_types::HandlerResult;

use crate::context::HandlerContextFactory;
use crate::descriptor::HandlerDescriptor;
use crate::error::{SubscribeError, TopicScope};
use crate::handler::DispatchStyle;
use crate::subscriber::SubscriptionInfo;

/// Runs one handler for one decoded message: create context, begin,
/// resolve the handler instance, invoke it, end the context. Returns the
/// invocation outcome; the bundle callback logs it.
pub(crate) type InvokeFn = Arc<
    dyn Fn(
            Arc<dyn HandlerContextFactory>,
            Arc<dyn Any + Send + Sync>,
            CancellationToken,
        ) -> BoxFuture<'static, HandlerResult>
        + Send
        + Sync,
>;

/// Registers a bundle's delivery callback with the media.
///
/// Captures the bundle's message type statically; produced by the first
/// descriptor subscribed under a key and shared by the bundle afterwards.
pub(crate) type RegistrarFn = Arc<
    dyn Fn(
            &InMemoryMedia,
            Option<String>,
            Arc<dyn HandlerContextFactory>,
            Arc<[BundleEntry]>,
            CancellationToken,
        ) -> Result<SubscriptionHandle, mq_media::SubscribeError>
        + Send
        + Sync,
>;

/// One handler registration within a bundle.
#[derive(Clone)]
pub(crate) struct BundleEntry {
    pub(crate) handler_type: TypeId,
    pub(crate) handler_type_name: &'static str,
    pub(crate) invoke: InvokeFn,
}

/// Handler registrations sharing one (message type, topic) key.
pub(crate) struct Bundle {
    message_type: TypeId,
    message_type_name: &'static str,
    topic: Option<String>,
    style: DispatchStyle,
    entries: Vec<BundleEntry>,
    registrar: RegistrarFn,
}

impl Bundle {
    /// Creates the bundle for a key from its first handler.
    pub(crate) fn new(topic: Option<String>, descriptor: HandlerDescriptor) -> Self {
        let mut bundle = Self {
            message_type: descriptor.message_type,
            message_type_name: descriptor.message_type_name,
            topic,
            style: descriptor.style,
            entries: Vec::new(),
            registrar: descriptor.registrar.clone(),
        };
        bundle.entries.push(descriptor.into_entry());
        bundle
    }

    /// Whether this bundle owns the exact (message type, topic) key.
    pub(crate) fn matches(&self, message_type: TypeId, topic: Option<&str>) -> bool {
        self.message_type == message_type && self.topic.as_deref() == topic
    }

    /// Admits another handler, or rejects it with a stable error and no
    /// side effect. Style exclusivity is checked before duplication, as a
    /// style mismatch is the more fundamental conflict.
    pub(crate) fn admit(&mut self, descriptor: HandlerDescriptor) -> Result<(), SubscribeError> {
        if descriptor.style != self.style {
            return Err(SubscribeError::StyleConflict {
                handler: descriptor.handler_type_name,
                message_type: self.message_type_name,
                scope: TopicScope::of(self.topic.as_deref()),
                style: descriptor.style,
                existing: self.style,
            });
        }
        if self
            .entries
            .iter()
            .any(|entry| entry.handler_type == descriptor.handler_type)
        {
            return Err(SubscribeError::AlreadyRegistered {
                handler: descriptor.handler_type_name,
                message_type: self.message_type_name,
                scope: TopicScope::of(self.topic.as_deref()),
            });
        }
        self.entries.push(descriptor.into_entry());
        Ok(())
    }

    /// Instantiates the bundle into one media delivery callback and
    /// registers it. Called on every subscriber start; the entry list is
    /// frozen by then.
    pub(crate) fn register(
        &self,
        media: &InMemoryMedia,
        factory: Arc<dyn HandlerContextFactory>,
        cancel: CancellationToken,
    ) -> Result<SubscriptionHandle, mq_media::SubscribeError> {
        let entries: Arc<[BundleEntry]> = Arc::from(self.entries.clone());
        (self.registrar)(media, self.topic.clone(), factory, entries, cancel)
    }

    /// Introspection record for this bundle.
    pub(crate) fn info(&self) -> SubscriptionInfo {
        SubscriptionInfo {
            message_type: self.message_type_name,
            topic: self.topic.clone(),
            style: self.style,
            handler_types: self
                .entries
                .iter()
                .map(|entry| entry.handler_type_name)
                .collect(),
        }
    }
}
