//! OS-scheduled background producer for current-location rows.

use std::sync::Arc;

use crate::models::location::Fix;
use crate::services::active_user::ActiveUserHandle;
use crate::services::location_writer::LocationWriter;

/// Stable identifier the background task is registered under.
pub const BACKGROUND_LOCATION_TASK: &str = "background-location-task";

/// One location upsert per scheduler invocation.
///
/// Runs detached from the screen that started tracking, so it resolves the
/// user through the shared [`ActiveUserHandle`] rather than a captured id.
pub struct BackgroundTrackingTask {
    active_user: Arc<ActiveUserHandle>,
    writer: Arc<LocationWriter>,
}

impl BackgroundTrackingTask {
    pub fn new(active_user: Arc<ActiveUserHandle>, writer: Arc<LocationWriter>) -> Self {
        Self {
            active_user,
            writer,
        }
    }

    /// Handles one invocation from the platform scheduler.
    ///
    /// Takes the first fix of the batch; the row is overwritten on the next
    /// invocation anyway. Skips without writing when no user is signed in,
    /// which also covers the window where the task fires after logout
    /// cleared the handle but before unregistration landed. Store failures
    /// are logged and swallowed: a missed background update is invisible
    /// and the scheduler must never see this task fail.
    pub async fn on_invocation(&self, fixes: &[Fix]) {
        let Some(fix) = fixes.first() else {
            tracing::debug!("background invocation delivered no fixes");
            return;
        };
        let Some(user_id) = self.active_user.get() else {
            tracing::debug!("no active user, skipping background fix");
            return;
        };
        if let Err(err) = self.writer.write_fix(user_id, fix).await {
            tracing::warn!(%user_id, error = %err, "background location upsert failed");
        } else {
            tracing::debug!(%user_id, "background location updated");
        }
    }
}
