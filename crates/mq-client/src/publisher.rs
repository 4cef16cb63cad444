//! # Message Publisher
//!
//! A lifecycle-gated facade over the media's publish operation. Publishing
//! is legal only while running; everything else about publish — argument
//! validation, synchronous encoding, enqueueing — is the media's business.

use tracing::debug;

use mq_media::InMemoryMedia;
use mq_types::{Lifecycle, LifecycleState, Message, StateError};

use crate::error::PublishError;

/// The publishing side of the MQ test double.
pub struct MessagePublisher {
    media: InMemoryMedia,
    lifecycle: Lifecycle,
}

impl MessagePublisher {
    pub fn new(media: InMemoryMedia) -> Self {
        Self {
            media,
            lifecycle: Lifecycle::new("message-publisher"),
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

    /// `Idle`/`Stopped` → `Running`.
    pub fn start(&mut self) -> Result<(), StateError> {
        self.lifecycle.start()?;
        debug!(publisher = self.lifecycle.name(), "publisher started");
        Ok(())
    }

    /// `Running` → `Stopped`.
    pub fn stop(&mut self) -> Result<(), StateError> {
        self.lifecycle.stop()?;
        debug!(publisher = self.lifecycle.name(), "publisher stopped");
        Ok(())
    }

    /// Terminal; legal from any state and idempotent.
    pub fn dispose(&mut self) {
        if self.lifecycle.dispose() {
            debug!(publisher = self.lifecycle.name(), "publisher disposed");
        }
    }

    /// Publishes a message through the media.
    ///
    /// Requires `Running`; argument and encoding failures surface
    /// synchronously from this call.
    pub fn publish<M: Message>(&self, message: &M) -> Result<(), PublishError> {
        self.lifecycle
            .require("publish", &[LifecycleState::Running])?;
        self.media.publish(message)?;
        Ok(())
    }
}

impl Drop for MessagePublisher {
    fn drop(&mut self) {
        self.dispose();
    }
}
