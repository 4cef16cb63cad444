//! # MQ Client Crate
//!
//! The consuming side of the MQ test double:
//!
//! - [`MessageHandler`] / [`AsyncMessageHandler`]: the two handler
//!   invocation contracts (dispatch styles).
//! - [`HandlerDescriptor`]: the typed registration record — each handler
//!   declares its message type and dispatch style statically, validated at
//!   subscribe time.
//! - [`HandlerContext`] / [`HandlerContextFactory`]: the per-invocation
//!   scope used to resolve handler instances.
//! - [`MessageSubscriber`]: collects handler registrations into bundles
//!   (one per (message type, topic) key, one dispatch style per bundle),
//!   registers them with the media on start, cancels and unregisters on
//!   stop/dispose.
//! - [`MessagePublisher`]: a lifecycle-gated publishing facade.

pub mod bundle;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod handler;
pub mod publisher;
pub mod subscriber;

pub use context::{ContextError, HandlerContext, HandlerContextFactory, ServiceRequest};
pub use descriptor::HandlerDescriptor;
pub use error::{PublishError, StartError, SubscribeError, TopicScope};
pub use handler::{AsyncMessageHandler, DispatchStyle, MessageHandler};
pub use publisher::MessagePublisher;
pub use subscriber::{MessageSubscriber, SubscriptionInfo};
