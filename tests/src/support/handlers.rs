//! # Test Handlers
//!
//! Sync and async handlers over the test messages, well-behaved and not.
//! Every handler records into the injected [`MessageRepository`]; the
//! misbehaving ones fail or cancel on purpose so the suite can prove that
//! one handler's outcome never leaks into a sibling's.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use mq_client::{AsyncMessageHandler, MessageHandler};
use mq_types::{HandlerError, HandlerResult, Message};

use super::messages::{ByeMessage, HelloMessage};
use super::repository::MessageRepository;

fn scope(topic: Option<&str>) -> String {
    match topic {
        None => "(no topic)".to_string(),
        Some(topic) => format!("(topic: '{topic}')"),
    }
}

/// Sleeps `ms` unless cancelled first.
async fn delay(ms: u64, cancel: &CancellationToken) -> HandlerResult {
    if ms == 0 {
        return Ok(());
    }
    tokio::select! {
        _ = cancel.cancelled() => Err(HandlerError::Cancelled),
        _ = tokio::time::sleep(Duration::from_millis(ms)) => Ok(()),
    }
}

pub struct HelloHandler {
    pub repository: MessageRepository,
}

impl MessageHandler<HelloMessage> for HelloHandler {
    fn handle(&self, message: &HelloMessage) -> HandlerResult {
        self.repository
            .record(format!("hello sync {}, {}", scope(message.topic()), message.name));
        Ok(())
    }
}

pub struct WelcomeHandler {
    pub repository: MessageRepository,
}

impl MessageHandler<HelloMessage> for WelcomeHandler {
    fn handle(&self, message: &HelloMessage) -> HandlerResult {
        self.repository
            .record(format!("welcome sync {}, {}", scope(message.topic()), message.name));
        Ok(())
    }
}

/// Fails for any name containing "fish", case-insensitively.
pub struct FishHaterHandler {
    pub repository: MessageRepository,
}

impl MessageHandler<HelloMessage> for FishHaterHandler {
    fn handle(&self, message: &HelloMessage) -> HandlerResult {
        if message.name.to_lowercase().contains("fish") {
            return Err(HandlerError::failed(format!(
                "i hate you sync {}, '{}'!",
                scope(message.topic()),
                message.name
            )));
        }
        self.repository.record(format!(
            "not fish - then hi sync {}, {}",
            scope(message.topic()),
            message.name
        ));
        Ok(())
    }
}

pub struct ByeHandler {
    pub repository: MessageRepository,
}

impl MessageHandler<ByeMessage> for ByeHandler {
    fn handle(&self, message: &ByeMessage) -> HandlerResult {
        self.repository
            .record(format!("bye sync {}, {}", scope(message.topic()), message.name));
        Ok(())
    }
}

pub struct HelloAsyncHandler {
    pub repository: MessageRepository,
}

#[async_trait]
impl AsyncMessageHandler<HelloMessage> for HelloAsyncHandler {
    async fn handle(&self, message: &HelloMessage, cancel: &CancellationToken) -> HandlerResult {
        delay(message.delay_ms, cancel).await?;
        self.repository
            .record(format!("hello async {}, {}", scope(message.topic()), message.name));
        Ok(())
    }
}

pub struct WelcomeAsyncHandler {
    pub repository: MessageRepository,
}

#[async_trait]
impl AsyncMessageHandler<HelloMessage> for WelcomeAsyncHandler {
    async fn handle(&self, message: &HelloMessage, cancel: &CancellationToken) -> HandlerResult {
        delay(message.delay_ms, cancel).await?;
        self.repository
            .record(format!("welcome async {}, {}", scope(message.topic()), message.name));
        Ok(())
    }
}

pub struct FishHaterAsyncHandler {
    pub repository: MessageRepository,
}

#[async_trait]
impl AsyncMessageHandler<HelloMessage> for FishHaterAsyncHandler {
    async fn handle(&self, message: &HelloMessage, cancel: &CancellationToken) -> HandlerResult {
        delay(message.delay_ms, cancel).await?;
        if message.name.to_lowercase().contains("fish") {
            return Err(HandlerError::failed(format!(
                "i hate you async {}, '{}'!",
                scope(message.topic()),
                message.name
            )));
        }
        self.repository.record(format!(
            "not fish - then hi async {}, {}",
            scope(message.topic()),
            message.name
        ));
        Ok(())
    }
}

/// Reports the cancellation outcome on its own, mid-handling.
pub struct CancelingAsyncHandler {
    pub repository: MessageRepository,
}

#[async_trait]
impl AsyncMessageHandler<HelloMessage> for CancelingAsyncHandler {
    async fn handle(&self, _message: &HelloMessage, cancel: &CancellationToken) -> HandlerResult {
        delay(20, cancel).await?;
        Err(HandlerError::Cancelled)
    }
}

/// Fails every invocation, mid-handling.
pub struct FaultingAsyncHandler {
    pub repository: MessageRepository,
}

#[async_trait]
impl AsyncMessageHandler<HelloMessage> for FaultingAsyncHandler {
    async fn handle(&self, message: &HelloMessage, cancel: &CancellationToken) -> HandlerResult {
        delay(20, cancel).await?;
        Err(HandlerError::failed(format!(
            "sorry, i am faulting async {}, {}",
            scope(message.topic()),
            message.name
        )))
    }
}
