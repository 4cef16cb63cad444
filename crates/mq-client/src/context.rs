//! # Handler Context
//!
//! The per-invocation scope around a handler: begun before the handler is
//! resolved, ended after the invocation settles, dropped afterwards. The
//! context owns service resolution, which is how handler instances receive
//! their collaborators (a message collector, a fake clock, ...) without
//! global singletons.

use std::any::{Any, TypeId};

use thiserror::Error;

/// Errors from the context factory or any context step.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("{0}")]
    Failed(String),
}

impl ContextError {
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self::Failed(reason.to_string())
    }
}

/// Identifies the handler instance a context is asked to resolve.
#[derive(Debug, Clone, Copy)]
pub struct ServiceRequest {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl ServiceRequest {
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }
}

/// One handler invocation's scope.
///
/// Every step may fail; each failure is caught and logged independently by
/// the invocation machinery and never aborts sibling handler executions.
/// Disposal happens on drop.
pub trait HandlerContext: Send {
    /// Opens the scope.
    fn begin(&mut self) -> Result<(), ContextError>;

    /// Resolves the handler instance for `request`. The returned value must
    /// downcast to the requested handler type; anything else is reported as
    /// a wrong-service failure.
    fn get_service(&mut self, request: &ServiceRequest) -> Result<Box<dyn Any + Send>, ContextError>;

    /// Closes the scope after the invocation settled.
    fn end(&mut self) -> Result<(), ContextError>;
}

/// Creates one [`HandlerContext`] per handler invocation.
pub trait HandlerContextFactory: Send + Sync {
    fn create_context(&self) -> Result<Box<dyn HandlerContext>, ContextError>;
}
