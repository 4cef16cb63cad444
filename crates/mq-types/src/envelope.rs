//! # Transport Envelope
//!
//! The queued representation of one published message instance.

use std::any::TypeId;

/// An encoded, queued representation of one published message awaiting
/// dispatch.
///
/// Built synchronously at publish time — encoding failures surface to the
/// publish caller, not to a later dispatch step — and consumed exactly once
/// by the dispatch loop.
#[derive(Debug, Clone)]
pub struct TransportEnvelope {
    /// Routing identity of the payload's message type.
    pub type_id: TypeId,
    /// Message type name, for logs and errors.
    pub type_name: &'static str,
    /// JSON-encoded payload.
    pub payload: String,
    /// Topic the message was published under, if any.
    pub topic: Option<String>,
}
