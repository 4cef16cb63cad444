//! # Media Error Types

use thiserror::Error;

/// Errors surfaced synchronously by [`InMemoryMedia::publish`](crate::InMemoryMedia::publish).
///
/// Everything the caller can act on fails before the message enters the
/// asynchronous pipeline; failures discovered during dispatch are logged,
/// never propagated back to the publisher.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The media has been disposed; its dispatch worker is gone.
    #[error("cannot publish: media is disposed")]
    Disposed,

    /// The message carries an empty topic string. An empty topic is not a
    /// topic-less publication; omit the topic instead.
    #[error("topic cannot be empty; publish without a topic for a topic-less delivery")]
    EmptyTopic,

    /// Encoding the message to the transport encoding failed.
    #[error("failed to encode message of type '{message_type}': {source}")]
    Encode {
        message_type: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced synchronously by the media's `subscribe` operations.
#[derive(Debug, Error)]
pub enum SubscribeError {
    /// The media has been disposed.
    #[error("cannot subscribe: media is disposed")]
    Disposed,

    /// An empty topic string was supplied. An empty topic is distinct from
    /// no topic; use the topic-less subscribe instead.
    #[error("topic cannot be empty; use the topic-less subscribe for a topic-less subscription")]
    EmptyTopic,
}
