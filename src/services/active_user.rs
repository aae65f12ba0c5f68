//! Shared handle naming the signed-in user.

use std::sync::RwLock;

use crate::types::UserId;

/// Thread-safe single-slot store for the signed-in user's id.
///
/// The lifecycle writes it on login/logout; the background task only ever
/// reads. It lives behind an `Arc` and is injected into both, so producers
/// detached from the call stack that started tracking can still resolve
/// which row to write under. Cleared at logout before unregistration
/// completes, which is what stops a late-firing background invocation from
/// writing under a stale identity.
#[derive(Debug, Default)]
pub struct ActiveUserHandle {
    slot: RwLock<Option<UserId>>,
}

impl ActiveUserHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user_id: UserId) {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(user_id);
    }

    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn get(&self) -> Option<UserId> {
        *self.slot.read().unwrap_or_else(|e| e.into_inner())
    }
}
