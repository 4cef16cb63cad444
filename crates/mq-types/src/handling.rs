//! # Handler Invocation Results
//!
//! The outcome of one handler invocation. Cancellation is a distinct
//! variant rather than an error message to be matched: stopping a
//! subscriber mid-invocation reports [`HandlerError::Cancelled`], and the
//! dispatch loop logs it apart from ordinary failures.

use thiserror::Error;

/// Result of a single handler invocation.
pub type HandlerResult = Result<(), HandlerError>;

/// Failure modes of a handler invocation.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The invocation was cancelled (the owning subscriber stopped or was
    /// disposed while the handler was in flight).
    #[error("invocation was cancelled")]
    Cancelled,

    /// The handler body, or one of the steps around it (decoding, context
    /// begin/resolve/end), failed.
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    /// Ordinary failure from anything displayable.
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self::Failed(reason.to_string())
    }

    /// Whether this is the cancellation outcome.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
