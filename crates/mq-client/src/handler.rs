//! # Handler Contracts
//!
//! A handler type commits to exactly one message type and one dispatch
//! style. The style is exclusive per subscription key: synchronous and
//! asynchronous handlers never share a (message type, topic) bundle.

use std::fmt;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use mq_types::{HandlerResult, Message};

/// Whether a handler's invocation contract is synchronous or asynchronous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStyle {
    Sync,
    Async,
}

impl fmt::Display for DispatchStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => write!(f, "synchronous"),
            Self::Async => write!(f, "asynchronous"),
        }
    }
}

/// A synchronous message handler.
///
/// Runs on the dispatch worker; keep the body short, the worker moves to
/// the next delivery only when it returns.
pub trait MessageHandler<M: Message>: Send + Sync {
    fn handle(&self, message: &M) -> HandlerResult;
}

/// An asynchronous message handler.
///
/// The dispatch worker awaits the invocation before the next delivery.
/// `cancel` fires when the owning subscriber stops or is disposed;
/// long-running handlers should observe it and return
/// [`HandlerError::Cancelled`](mq_types::HandlerError::Cancelled).
#[async_trait]
pub trait AsyncMessageHandler<M: Message>: Send + Sync {
    async fn handle(&self, message: &M, cancel: &CancellationToken) -> HandlerResult;
}
