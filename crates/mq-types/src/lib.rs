//! # MQ Types Crate
//!
//! Contracts shared between the in-memory media (`mq-media`) and the
//! client-side machinery (`mq-client`):
//!
//! - [`Message`]: the routable, serializable message contract.
//! - [`TransportEnvelope`]: the encoded representation queued for dispatch.
//! - [`HandlerResult`] / [`HandlerError`]: the outcome of one handler
//!   invocation, with cancellation as a distinct variant.
//! - [`Lifecycle`] / [`LifecycleState`]: the four-state machine behind the
//!   publisher and the subscriber.
//! - [`QueueWorker`]: the single-consumer ordered queue that drives the
//!   media's dispatch loop.

pub mod envelope;
pub mod handling;
pub mod lifecycle;
pub mod message;
pub mod worker;

pub use envelope::TransportEnvelope;
pub use handling::{HandlerError, HandlerResult};
pub use lifecycle::{Lifecycle, LifecycleState, StateError};
pub use message::Message;
pub use worker::{QueueWorker, WorkerError};
