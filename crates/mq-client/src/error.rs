//! # Client Error Types

use std::fmt;

use thiserror::Error;

use mq_types::StateError;

use crate::handler::DispatchStyle;

/// Renders the topic component of a subscription key in error texts:
/// `(no topic)` or `(topic: 'orders')`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicScope(pub Option<String>);

impl TopicScope {
    pub fn topicless() -> Self {
        Self(None)
    }

    pub fn of(topic: Option<&str>) -> Self {
        Self(topic.map(str::to_string))
    }
}

impl fmt::Display for TopicScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => write!(f, "(no topic)"),
            Some(topic) => write!(f, "(topic: '{topic}')"),
        }
    }
}

/// Errors surfaced synchronously by the subscriber's `subscribe`
/// operations, before any registration side effect occurs.
#[derive(Debug, Error)]
pub enum SubscribeError {
    /// Subscribe is legal only while the subscriber is idle.
    #[error(transparent)]
    State(#[from] StateError),

    /// An empty topic string was supplied; omit the topic instead.
    #[error("topic cannot be empty; use the topic-less subscribe for a topic-less subscription")]
    EmptyTopic,

    /// The bundle for this key already holds handlers of the other
    /// dispatch style.
    #[error("cannot subscribe {style} handler '{handler}' to message type '{message_type}' {scope} because {existing} handlers exist for that subscription")]
    StyleConflict {
        handler: &'static str,
        message_type: &'static str,
        scope: TopicScope,
        style: DispatchStyle,
        existing: DispatchStyle,
    },

    /// The identical handler type is already registered under the
    /// identical key.
    #[error("handler type '{handler}' is already registered for message type '{message_type}' {scope}")]
    AlreadyRegistered {
        handler: &'static str,
        message_type: &'static str,
        scope: TopicScope,
    },
}

/// Errors from [`MessageSubscriber::start`](crate::MessageSubscriber::start).
#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    State(#[from] StateError),

    /// The media rejected a bundle registration (it was disposed).
    #[error("media rejected a bundle registration: {0}")]
    Media(#[from] mq_media::SubscribeError),
}

/// Errors from [`MessagePublisher::publish`](crate::MessagePublisher::publish).
#[derive(Debug, Error)]
pub enum PublishError {
    /// Publish is legal only while the publisher is running.
    #[error(transparent)]
    State(#[from] StateError),

    /// The media refused the message (argument, encoding, or disposal).
    #[error(transparent)]
    Media(#[from] mq_media::PublishError),
}
