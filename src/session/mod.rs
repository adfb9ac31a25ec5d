//! Session state
//!
//! Thin boundary to the hosted auth service: the rest of the system only
//! ever sees "anonymous" or "signed in as". State changes arrive through
//! a watch channel so callers re-subscribe instead of polling.

use tokio::sync::watch;

use crate::domain::UserId;

/// Snapshot of who is signed in right now.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    SignedIn(UserId),
}

impl SessionState {
    pub fn identity(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::SignedIn(identity) => Some(identity),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

/// Source of the current identity.
pub trait SessionProvider: Send + Sync {
    /// Synchronous snapshot; may change at any time afterwards.
    fn current(&self) -> SessionState;

    /// Change notifications. The receiver always reflects the latest
    /// state on `borrow()`.
    fn subscribe(&self) -> watch::Receiver<SessionState>;
}

/// In-process session holder fed by the auth callback.
pub struct SessionHandle {
    tx: watch::Sender<SessionState>,
}

impl SessionHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::Anonymous);
        Self { tx }
    }

    pub fn signed_in(identity: UserId) -> Self {
        let handle = Self::new();
        handle.sign_in(identity);
        handle
    }

    pub fn sign_in(&self, identity: UserId) {
        // send_replace updates the value even with no subscribers yet
        self.tx.send_replace(SessionState::SignedIn(identity));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(SessionState::Anonymous);
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for SessionHandle {
    fn current(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}
