//! # Message Contract
//!
//! The media routes messages by their Rust type, optionally narrowed by a
//! topic string. Every delivery round-trips the message through the
//! transport encoding (JSON), exactly as it would against a real broker, so
//! serialization bugs in message types surface in tests the same way they
//! would in production.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A routable, serializable message.
///
/// The routing identity of a message is its Rust type; [`topic`](Self::topic)
/// narrows routing further. Messages are encoded at publish time and a fresh
/// instance is decoded for every delivery, so handlers never share state
/// through a message.
pub trait Message: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Topic qualifier for routing, if any.
    ///
    /// A message published without a topic reaches only topic-less
    /// subscriptions; a message published under a topic reaches topic-less
    /// subscriptions *and* subscriptions for that exact topic.
    fn topic(&self) -> Option<&str> {
        None
    }

    /// Correlation id, preserved across the transport round trip.
    fn correlation_id(&self) -> Option<&str> {
        None
    }
}
