//! Orchestration of the active-session and current-location invariants.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use crate::error::{LifecycleError, LocationError};
use crate::models::session::Session;
use crate::repositories::SessionStore;
use crate::services::active_user::ActiveUserHandle;
use crate::services::background::{BackgroundTrackingTask, BACKGROUND_LOCATION_TASK};
use crate::services::location_provider::{LocationProvider, WatchOptions};
use crate::services::location_writer::LocationWriter;
use crate::services::scheduler::{BackgroundScheduler, TaskRegistration};
use crate::services::watcher::Subscription;
use crate::types::UserId;
use crate::utils::time::Clock;

/// Per-login state the lifecycle keeps for teardown.
struct ActiveTracking {
    username: String,
    watcher: Option<Arc<Subscription>>,
}

/// Single source of truth for who is signed in and whether location
/// capture is running.
///
/// `login` and `logout` each suspend at every store round trip and must
/// not overlap; the caller serializes them (disable the triggering control
/// until the in-flight call settles). Both appear atomic from outside:
/// they return once settled, never mid-flight.
pub struct SessionLifecycle {
    store: Arc<dyn SessionStore>,
    provider: Arc<dyn LocationProvider>,
    scheduler: Arc<dyn BackgroundScheduler>,
    clock: Arc<dyn Clock>,
    config: Config,
    active_user: Arc<ActiveUserHandle>,
    writer: Arc<LocationWriter>,
    background_task: Arc<BackgroundTrackingTask>,
    tracking: Mutex<Option<ActiveTracking>>,
}

impl SessionLifecycle {
    pub fn new(
        store: Arc<dyn SessionStore>,
        provider: Arc<dyn LocationProvider>,
        scheduler: Arc<dyn BackgroundScheduler>,
        clock: Arc<dyn Clock>,
        config: Config,
    ) -> Self {
        let active_user = Arc::new(ActiveUserHandle::new());
        let writer = Arc::new(LocationWriter::new(Arc::clone(&store), Arc::clone(&clock)));
        let background_task = Arc::new(BackgroundTrackingTask::new(
            Arc::clone(&active_user),
            Arc::clone(&writer),
        ));
        Self {
            store,
            provider,
            scheduler,
            clock,
            config,
            active_user,
            writer,
            background_task,
            tracking: Mutex::new(None),
        }
    }

    /// Read-only view of the signed-in user. No side effects.
    pub fn current_user_id(&self) -> Option<UserId> {
        self.active_user.get()
    }

    /// The invocation handler a platform binding wires to its background
    /// task callback.
    pub fn background_task(&self) -> Arc<BackgroundTrackingTask> {
        Arc::clone(&self.background_task)
    }

    /// Establishes the active session for `user_id` and starts both
    /// location producers.
    ///
    /// The caller has already authenticated the credentials. Of the six
    /// steps only the permission prompt and the session upsert are fatal;
    /// the initial fix, the background registration, and the watcher start
    /// are better-effort and logged on failure.
    pub async fn login(&self, user_id: UserId, username: &str) -> Result<(), LifecycleError> {
        // 1. No permission, no login: at least one fix must be attemptable.
        self.provider.request_foreground_permission().await?;

        // 2. Better-effort initial fix; the next scheduled one makes up
        //    for a miss.
        match self.provider.current_fix().await {
            Ok(fix) => {
                if let Err(err) = self.writer.write_fix(user_id, &fix).await {
                    tracing::warn!(%user_id, error = %err, "initial location upsert failed");
                }
            }
            Err(err) => tracing::warn!(%user_id, error = %err, "initial fix unavailable"),
        }

        // 3. The session row is the durable login record; failure aborts.
        let session = Session::logged_in(user_id, username, self.clock.now());
        self.store.upsert_session(&session).await?;

        // 4. Background capture is an upgrade, not a requirement;
        //    foreground tracking still runs without it.
        if let Err(err) = self.start_background_tracking().await {
            tracing::warn!(%user_id, error = %err, "background tracking not started");
        }

        // 5. From here on, detached producers resolve this identity.
        self.active_user.set(user_id);
        *self.tracking.lock().unwrap_or_else(|e| e.into_inner()) = Some(ActiveTracking {
            username: username.to_string(),
            watcher: None,
        });

        // 6. Foreground watcher.
        if let Err(err) = self.start_watcher(user_id).await {
            tracing::warn!(%user_id, error = %err, "foreground watcher not started");
        }

        tracing::info!(%user_id, username, "login complete, session stored, tracking started");
        Ok(())
    }

    /// Stops both producers, clears the active user, and writes the logout
    /// bookkeeping.
    ///
    /// Teardown (stopping producers, clearing the handle) always completes
    /// first and is never rolled back; failures in the two bookkeeping
    /// writes are reported through the returned error after both were
    /// attempted. Calling with no active user is a no-op success.
    pub async fn logout(&self) -> Result<(), LifecycleError> {
        let Some(user_id) = self.active_user.get() else {
            tracing::debug!("logout with no active user is a no-op");
            return Ok(());
        };
        let tracking = self.tracking.lock().unwrap_or_else(|e| e.into_inner()).take();

        // 1. Stop producers first so nothing further lands under this
        //    identity.
        if let Err(err) = self.scheduler.unregister(BACKGROUND_LOCATION_TASK).await {
            tracing::warn!(error = %err, "background task unregistration failed");
        }
        if let Some(watcher) = tracking.as_ref().and_then(|t| t.watcher.as_ref()) {
            watcher.cancel();
        }

        // 2. A background invocation racing past unregistration now finds
        //    no identity and skips.
        self.active_user.clear();

        // 3-4. Bookkeeping. Both writes are attempted even if the first
        //      fails; the teardown above stands either way.
        let username = tracking.map(|t| t.username).unwrap_or_default();
        let mut first_error: Option<LifecycleError> = None;

        let session = Session::logged_out(user_id, username, self.clock.now());
        if let Err(err) = self.store.upsert_session(&session).await {
            tracing::error!(%user_id, error = %err, "logout session upsert failed");
            first_error.get_or_insert(LifecycleError::Store(err));
        }
        if let Err(err) = self.store.delete_location(user_id).await {
            tracing::error!(%user_id, error = %err, "location row deletion failed");
            first_error.get_or_insert(LifecycleError::Store(err));
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                tracing::info!(%user_id, "logout complete, tracking stopped");
                Ok(())
            }
        }
    }

    /// Re-hydrates the signed-in user after a process restart.
    ///
    /// The platform may still invoke a background task registered by a
    /// previous process; re-setting the handle lets those writes resolve
    /// again. Returns `Ok(None)` and stays signed out when the store has
    /// no active session row.
    pub async fn restore(&self) -> Result<Option<UserId>, LifecycleError> {
        let Some(session) = self.store.latest_active_session().await? else {
            return Ok(None);
        };
        let user_id = session.user_id;

        self.active_user.set(user_id);
        *self.tracking.lock().unwrap_or_else(|e| e.into_inner()) = Some(ActiveTracking {
            username: session.username,
            watcher: None,
        });

        if let Err(err) = self.start_watcher(user_id).await {
            tracing::warn!(%user_id, error = %err, "foreground watcher not restored");
        }

        tracing::info!(%user_id, "session restored from store");
        Ok(Some(user_id))
    }

    async fn start_background_tracking(&self) -> Result<(), LocationError> {
        self.provider.request_background_permission().await?;
        let registration = TaskRegistration {
            task_id: BACKGROUND_LOCATION_TASK.to_string(),
            min_interval: Duration::from_secs(self.config.background_interval_secs),
            min_distance_meters: self.config.background_distance_meters,
            notification_title: self.config.notification_title.clone(),
            notification_body: self.config.notification_body.clone(),
        };
        self.scheduler
            .register(registration, Arc::clone(&self.background_task))
            .await
    }

    async fn start_watcher(&self, user_id: UserId) -> Result<(), LocationError> {
        let options = WatchOptions {
            min_interval: Duration::from_secs(self.config.watch_interval_secs),
            min_distance_meters: self.config.watch_distance_meters,
        };
        let mut fixes = self.provider.watch(options).await?;

        let writer = Arc::clone(&self.writer);
        let handle = tokio::spawn(async move {
            while let Some(fix) = fixes.recv().await {
                if let Err(err) = writer.write_fix(user_id, &fix).await {
                    tracing::warn!(%user_id, error = %err, "foreground location upsert failed");
                }
            }
        });

        let subscription = Arc::new(Subscription::new(handle));
        let mut tracking = self.tracking.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(state) = tracking.as_mut() {
            if let Some(previous) = state.watcher.replace(subscription) {
                previous.cancel();
            }
        } else {
            // Login/logout raced the watcher start; without teardown state
            // to park the handle in, stop the watcher again.
            subscription.cancel();
        }
        Ok(())
    }
}
