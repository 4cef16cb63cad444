//! # Four-State Lifecycle
//!
//! The publisher and the subscriber share one lifecycle shape:
//!
//! ```text
//! Idle ──start──> Running ──stop──> Stopped ──start──> Running ...
//!   │                │                 │
//!   └────────────────┴────dispose──────┴──> Disposed (terminal)
//! ```
//!
//! Operations attempted in the wrong state fail synchronously with a
//! [`StateError`] naming the operation and the current state.

use std::fmt;
use thiserror::Error;

/// Lifecycle states shared by the publisher and the subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, not yet started. The subscriber accepts `subscribe` calls
    /// only in this state.
    Idle,
    /// Started; operational calls (`publish`, dispatch) are legal.
    Running,
    /// Stopped; can be started again.
    Stopped,
    /// Terminal; every operation except an idempotent dispose is rejected.
    Disposed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Running => write!(f, "Running"),
            Self::Stopped => write!(f, "Stopped"),
            Self::Disposed => write!(f, "Disposed"),
        }
    }
}

/// Errors for operations attempted in the wrong lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The operation is not legal in the current state.
    #[error("inappropriate lifecycle state ({state}) for '{operation}'")]
    Inappropriate {
        operation: &'static str,
        state: LifecycleState,
    },

    /// The instance has been disposed.
    #[error("'{name}' is disposed")]
    Disposed { name: String },
}

/// State and instance name behind a lifecycle-gated component.
#[derive(Debug)]
pub struct Lifecycle {
    name: String,
    state: LifecycleState,
}

impl Lifecycle {
    /// Creates a lifecycle in [`LifecycleState::Idle`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: LifecycleState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Instance name, readable in every state including `Disposed`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the instance. Rejected once disposed.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), StateError> {
        if self.is_disposed() {
            return Err(self.disposed_error());
        }
        self.name = name.into();
        Ok(())
    }

    /// Whether `dispose` has been called.
    pub fn is_disposed(&self) -> bool {
        self.state == LifecycleState::Disposed
    }

    /// Fails unless the current state is one of `allowed`. Disposal is
    /// reported as its own error regardless of `allowed`.
    pub fn require(
        &self,
        operation: &'static str,
        allowed: &[LifecycleState],
    ) -> Result<(), StateError> {
        if self.is_disposed() {
            return Err(self.disposed_error());
        }
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(StateError::Inappropriate {
                operation,
                state: self.state,
            })
        }
    }

    /// `Idle`/`Stopped` → `Running`.
    pub fn start(&mut self) -> Result<(), StateError> {
        self.require("start", &[LifecycleState::Idle, LifecycleState::Stopped])?;
        self.state = LifecycleState::Running;
        Ok(())
    }

    /// `Running` → `Stopped`.
    pub fn stop(&mut self) -> Result<(), StateError> {
        self.require("stop", &[LifecycleState::Running])?;
        self.state = LifecycleState::Stopped;
        Ok(())
    }

    /// Any state → `Disposed`. Returns `true` on the first call, `false`
    /// when already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.state = LifecycleState::Disposed;
        true
    }

    fn disposed_error(&self) -> StateError {
        StateError::Disposed {
            name: self.name.clone(),
        }
    }
}
