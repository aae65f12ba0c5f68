//! Store-facing trait for session and current-location rows.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::location::CurrentLocation;
use crate::models::session::Session;
use crate::types::UserId;

/// Keyed record store behind the lifecycle orchestration.
///
/// Both tables are keyed by `user_id` and every write is insert-or-replace,
/// so the store holds at most one row per user in each table. Key
/// uniqueness is the store's own responsibility; this trait only promises
/// well-formed upsert requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Inserts or replaces the session row for `session.user_id`.
    async fn upsert_session(&self, session: &Session) -> Result<(), StoreError>;

    /// Inserts or replaces the current-location row for
    /// `location.user_id`. Last write wins by arrival order.
    async fn upsert_location(&self, location: &CurrentLocation) -> Result<(), StoreError>;

    /// Removes the current-location row for `user_id`, if present.
    async fn delete_location(&self, user_id: UserId) -> Result<(), StoreError>;

    /// Most recently started active session, if any. Used to re-hydrate
    /// the signed-in user after a process restart.
    async fn latest_active_session(&self) -> Result<Option<Session>, StoreError>;
}
