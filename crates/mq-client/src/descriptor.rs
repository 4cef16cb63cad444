//! # Handler Descriptor
//!
//! The typed registration record: each handler declares its message type
//! and dispatch style through a descriptor constructor, so admissibility is
//! settled by trait bounds at compile time and the subscriber only has the
//! per-key checks (style exclusivity, duplication) left to do at runtime.

use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

use tracing::{debug, error, warn};

use mq_types::{HandlerError, HandlerResult, Message};

use crate::bundle::{BundleEntry, InvokeFn, RegistrarFn};
use crate::context::{HandlerContext, HandlerContextFactory, ServiceRequest};
use crate::handler::{AsyncMessageHandler, DispatchStyle, MessageHandler};

/// A handler type's registration record: message type, dispatch style and
/// the machinery to run one invocation.
///
/// Build one with [`HandlerDescriptor::sync`] or
/// [`HandlerDescriptor::asynchronous`] and pass it to the subscriber's
/// `subscribe` operations.
pub struct HandlerDescriptor {
    pub(crate) handler_type: TypeId,
    pub(crate) handler_type_name: &'static str,
    pub(crate) message_type: TypeId,
    pub(crate) message_type_name: &'static str,
    pub(crate) style: DispatchStyle,
    pub(crate) invoke: InvokeFn,
    pub(crate) registrar: RegistrarFn,
}

impl HandlerDescriptor {
    /// Descriptor for a synchronous handler of `M`.
    pub fn sync<M, H>() -> Self
    where
        M: Message,
        H: MessageHandler<M> + 'static,
    {
        let invoke: InvokeFn = Arc::new(|factory, message, _cancel| {
            Box::pin(async move {
                let message = downcast_message::<M>(message)?;
                let mut context = open_context::<H>(factory.as_ref())?;
                let handler = resolve_handler::<H>(context.as_mut())?;
                let outcome = handler.handle(&message);
                finish_context(context, type_name::<H>(), outcome)
            })
        });
        Self::build::<M, H>(DispatchStyle::Sync, invoke)
    }

    /// Descriptor for an asynchronous handler of `M`.
    pub fn asynchronous<M, H>() -> Self
    where
        M: Message,
        H: AsyncMessageHandler<M> + 'static,
    {
        let invoke: InvokeFn = Arc::new(|factory, message, cancel| {
            Box::pin(async move {
                let message = downcast_message::<M>(message)?;
                let mut context = open_context::<H>(factory.as_ref())?;
                let handler = resolve_handler::<H>(context.as_mut())?;
                let outcome = handler.handle(&message, &cancel).await;
                finish_context(context, type_name::<H>(), outcome)
            })
        });
        Self::build::<M, H>(DispatchStyle::Async, invoke)
    }

    /// The handler type's name, for introspection and error texts.
    pub fn handler_type_name(&self) -> &'static str {
        self.handler_type_name
    }

    /// The target message type's name.
    pub fn message_type_name(&self) -> &'static str {
        self.message_type_name
    }

    /// The declared dispatch style.
    pub fn style(&self) -> DispatchStyle {
        self.style
    }

    fn build<M: Message, H: 'static>(style: DispatchStyle, invoke: InvokeFn) -> Self {
        Self {
            handler_type: TypeId::of::<H>(),
            handler_type_name: type_name::<H>(),
            message_type: TypeId::of::<M>(),
            message_type_name: type_name::<M>(),
            style,
            invoke,
            registrar: registrar_for::<M>(),
        }
    }

    pub(crate) fn into_entry(self) -> BundleEntry {
        BundleEntry {
            handler_type: self.handler_type,
            handler_type_name: self.handler_type_name,
            invoke: self.invoke,
        }
    }
}

fn downcast_message<M: Message>(
    message: Arc<dyn Any + Send + Sync>,
) -> Result<Arc<M>, HandlerError> {
    message
        .downcast::<M>()
        .map_err(|_| HandlerError::failed(format!("delivery payload is not a '{}'", type_name::<M>())))
}

fn open_context<H: 'static>(
    factory: &dyn HandlerContextFactory,
) -> Result<Box<dyn HandlerContext>, HandlerError> {
    let mut context = factory.create_context().map_err(|err| {
        HandlerError::failed(format!("failed to create handler context: {err}"))
    })?;
    context.begin().map_err(|err| {
        HandlerError::failed(format!(
            "failed to begin handler context for '{}': {err}",
            type_name::<H>()
        ))
    })?;
    Ok(context)
}

fn resolve_handler<H: 'static>(context: &mut dyn HandlerContext) -> Result<Box<H>, HandlerError> {
    let request = ServiceRequest::of::<H>();
    let service = context.get_service(&request).map_err(|err| {
        HandlerError::failed(format!(
            "failed to resolve handler '{}': {err}",
            request.type_name
        ))
    })?;
    service.downcast::<H>().map_err(|_| {
        HandlerError::failed(format!(
            "context resolved a wrong service for handler '{}'",
            request.type_name
        ))
    })
}

/// Ends the context after the invocation settled. An end failure becomes
/// the outcome only when the invocation itself succeeded; otherwise it is
/// logged here and the invocation's own failure is kept.
fn finish_context(
    mut context: Box<dyn HandlerContext>,
    handler: &'static str,
    outcome: HandlerResult,
) -> HandlerResult {
    match context.end() {
        Ok(()) => outcome,
        Err(err) => {
            let end_failure =
                HandlerError::failed(format!("failed to end handler context: {err}"));
            match outcome {
                Ok(()) => Err(end_failure),
                Err(primary) => {
                    warn!(handler, error = %end_failure, "context end failed after a failed invocation");
                    Err(primary)
                }
            }
        }
    }
}

/// Builds the registrar that binds a bundle's delivery callback to the
/// media for message type `M`. The callback decodes once per delivery and
/// runs the bundle's handlers in registration order, logging each outcome
/// without letting one failure suppress the rest.
fn registrar_for<M: Message>() -> RegistrarFn {
    Arc::new(|media, topic, factory, entries, cancel| {
        let message_type = type_name::<M>();
        let callback = move |message: M, _media_cancel| {
            let factory = factory.clone();
            let entries = entries.clone();
            let cancel = cancel.clone();
            async move {
                let message: Arc<dyn Any + Send + Sync> = Arc::new(message);
                for entry in entries.iter() {
                    let outcome =
                        (entry.invoke)(factory.clone(), message.clone(), cancel.clone()).await;
                    match outcome {
                        Ok(()) => {
                            debug!(
                                handler = entry.handler_type_name,
                                message_type, "handler completed"
                            );
                        }
                        Err(err) if err.is_cancelled() => {
                            warn!(
                                handler = entry.handler_type_name,
                                message_type, "handler invocation was cancelled"
                            );
                        }
                        Err(err) => {
                            error!(
                                handler = entry.handler_type_name,
                                message_type,
                                error = %err,
                                "handler invocation failed"
                            );
                        }
                    }
                }
                Ok(())
            }
        };
        match topic {
            Some(topic) => media.subscribe_with_topic::<M, _, _>(&topic, callback),
            None => media.subscribe::<M, _, _>(callback),
        }
    })
}
