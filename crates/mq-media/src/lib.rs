//! # MQ Media Crate
//!
//! The in-memory broker of the MQ test double. Stands in for a real message
//! broker during tests without any network or persistent transport, while
//! reproducing the observable semantics one would exhibit:
//!
//! - **Topic-scoped routing**: messages route by their Rust type, optionally
//!   narrowed by a topic; topic-less subscriptions receive every message of
//!   their type.
//! - **Asynchronous decoupling**: `publish` encodes and enqueues, then
//!   returns; a single background worker delivers strictly in publish order.
//! - **At-least-once fan-out**: every currently-registered handler receives
//!   the message; one handler's failure never suppresses delivery to the
//!   others.
//! - **Realistic serialization**: the message is JSON-encoded at publish
//!   time and a fresh instance is decoded for every delivery, so
//!   serialization bugs surface exactly as they would against a real broker.

pub mod error;
pub mod handle;
pub mod media;
pub mod registry;

pub use error::{PublishError, SubscribeError};
pub use handle::SubscriptionHandle;
pub use media::InMemoryMedia;
pub use registry::SubscriptionKey;
