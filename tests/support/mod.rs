#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

use presence_tracker::error::{LocationError, StoreError};
use presence_tracker::models::{CurrentLocation, Fix, Session};
use presence_tracker::repositories::SessionStore;
use presence_tracker::services::{BackgroundScheduler, BackgroundTrackingTask, TaskRegistration};
use presence_tracker::types::UserId;
use presence_tracker::utils::time::Clock;

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "presence_tracker=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn jakarta(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Tz> {
    chrono_tz::Asia::Jakarta
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .unwrap()
}

/// Polls `cond` until it holds or a short deadline passes.
pub async fn eventually(cond: impl Fn() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within deadline");
}

/// Settable clock for pinning persisted timestamps.
pub struct FixedClock {
    now: Mutex<DateTime<Tz>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Tz>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Tz>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        *self.now.lock().unwrap()
    }
}

/// In-memory stand-in for the hosted record store.
///
/// Mirrors the real store's semantics: both maps are keyed by user id and
/// writes are insert-or-replace.
#[derive(Default)]
pub struct MemoryStore {
    pub sessions: Mutex<HashMap<UserId, Session>>,
    pub locations: Mutex<HashMap<UserId, CurrentLocation>>,
    pub fail_session_upserts: AtomicBool,
    pub fail_location_upserts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, user_id: UserId) -> Option<Session> {
        self.sessions.lock().unwrap().get(&user_id).cloned()
    }

    pub fn location(&self, user_id: UserId) -> Option<CurrentLocation> {
        self.locations.lock().unwrap().get(&user_id).cloned()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn upsert_session(&self, session: &Session) -> Result<(), StoreError> {
        if self.fail_session_upserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("session upsert refused".into()));
        }
        self.sessions
            .lock()
            .unwrap()
            .insert(session.user_id, session.clone());
        Ok(())
    }

    async fn upsert_location(&self, location: &CurrentLocation) -> Result<(), StoreError> {
        if self.fail_location_upserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("location upsert refused".into()));
        }
        self.locations
            .lock()
            .unwrap()
            .insert(location.user_id, location.clone());
        Ok(())
    }

    async fn delete_location(&self, user_id: UserId) -> Result<(), StoreError> {
        self.locations.lock().unwrap().remove(&user_id);
        Ok(())
    }

    async fn latest_active_session(&self) -> Result<Option<Session>, StoreError> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions
            .values()
            .filter(|s| s.is_active)
            .max_by_key(|s| s.login_time)
            .cloned())
    }
}

/// Scheduler whose invocations are fired by the test instead of a timer.
#[derive(Default)]
pub struct ManualScheduler {
    registered: Mutex<Option<(TaskRegistration, Arc<BackgroundTrackingTask>)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self) -> bool {
        self.registered.lock().unwrap().is_some()
    }

    pub fn registration(&self) -> Option<TaskRegistration> {
        self.registered
            .lock()
            .unwrap()
            .as_ref()
            .map(|(reg, _)| reg.clone())
    }

    /// Simulates the platform invoking the registered task.
    pub async fn fire(&self, fixes: &[Fix]) {
        let task = self
            .registered
            .lock()
            .unwrap()
            .as_ref()
            .map(|(_, task)| Arc::clone(task));
        if let Some(task) = task {
            task.on_invocation(fixes).await;
        }
    }
}

#[async_trait]
impl BackgroundScheduler for ManualScheduler {
    async fn register(
        &self,
        registration: TaskRegistration,
        task: Arc<BackgroundTrackingTask>,
    ) -> Result<(), LocationError> {
        *self.registered.lock().unwrap() = Some((registration, task));
        Ok(())
    }

    async fn unregister(&self, task_id: &str) -> Result<(), LocationError> {
        let mut registered = self.registered.lock().unwrap();
        if registered
            .as_ref()
            .is_some_and(|(reg, _)| reg.task_id == task_id)
        {
            *registered = None;
        }
        Ok(())
    }
}
