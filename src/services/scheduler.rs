//! Background task registration, modeled on the platform task manager.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::LocationError;
use crate::services::background::BackgroundTrackingTask;
use crate::services::location_provider::LocationProvider;

/// Parameters handed to the platform when registering background work.
#[derive(Debug, Clone)]
pub struct TaskRegistration {
    pub task_id: String,
    pub min_interval: Duration,
    /// Displacement hint; honored by device schedulers, ignored by the
    /// timer stand-in which polls on interval only.
    pub min_distance_meters: f64,
    /// Shown while a foreground service keeps background tracking alive.
    pub notification_title: String,
    pub notification_body: String,
}

/// Registers process-independent units of work invoked on the platform's
/// own schedule.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackgroundScheduler: Send + Sync {
    /// Registers `task` to run on the platform's schedule. Registering an
    /// id that is already registered replaces the previous registration.
    async fn register(
        &self,
        registration: TaskRegistration,
        task: Arc<BackgroundTrackingTask>,
    ) -> Result<(), LocationError>;

    /// Stops future invocations. A no-op (not an error) when the id was
    /// never registered, so teardown is safe on the permission-denied path.
    async fn unregister(&self, task_id: &str) -> Result<(), LocationError>;
}

/// Timer-driven scheduler standing in for the OS task manager on desktop
/// and test builds.
///
/// Each registration runs as a detached tokio task polling the provider
/// once per interval and feeding the invocation handler. Failures stay
/// inside the loop; a fix that cannot be obtained is logged and the next
/// tick tries again.
pub struct IntervalScheduler {
    provider: Arc<dyn LocationProvider>,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl IntervalScheduler {
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        Self {
            provider,
            tasks: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl BackgroundScheduler for IntervalScheduler {
    async fn register(
        &self,
        registration: TaskRegistration,
        task: Arc<BackgroundTrackingTask>,
    ) -> Result<(), LocationError> {
        tracing::info!(
            task_id = %registration.task_id,
            interval_secs = registration.min_interval.as_secs(),
            "registering background tracking task"
        );

        let provider = Arc::clone(&self.provider);
        let interval = registration.min_interval.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; skip it so the login
            // flow's one-shot fix owns the initial row.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match provider.current_fix().await {
                    Ok(fix) => task.on_invocation(&[fix]).await,
                    Err(err) => tracing::warn!(error = %err, "background fix unavailable"),
                }
            }
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = tasks.insert(registration.task_id, handle) {
            previous.abort();
        }
        Ok(())
    }

    async fn unregister(&self, task_id: &str) -> Result<(), LocationError> {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = tasks.remove(task_id) {
            handle.abort();
            tracing::info!(task_id, "unregistered background tracking task");
        }
        Ok(())
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
    }
}
