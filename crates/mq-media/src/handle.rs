//! # Subscription Handle

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;

use uuid::Uuid;

use crate::registry::{SubscriptionKey, SubscriptionRegistry};

/// A disposable capability returned by a successful registration.
///
/// Disposing removes exactly this registration's callback from the owning
/// media subscription; other callbacks under the same key are untouched.
/// Disposal is explicit — dropping the handle does not unsubscribe — and
/// idempotent.
#[derive(Debug)]
pub struct SubscriptionHandle {
    registry: Weak<SubscriptionRegistry>,
    key: SubscriptionKey,
    id: Uuid,
    disposed: AtomicBool,
}

impl SubscriptionHandle {
    pub(crate) fn new(registry: Weak<SubscriptionRegistry>, key: SubscriptionKey, id: Uuid) -> Self {
        Self {
            registry,
            key,
            id,
            disposed: AtomicBool::new(false),
        }
    }

    /// Removes this registration's callback. A second call is a no-op, as
    /// is disposing a handle that outlived its media.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(&self.key, self.id);
        }
    }

    /// Whether `dispose` has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}
