//! Capability surface over the device location service.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::LocationError;
use crate::models::location::Fix;

/// Stream of foreground fixes delivered by a provider.
pub type FixStream = mpsc::Receiver<Fix>;

/// Rate limits applied to the foreground watcher.
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    pub min_interval: Duration,
    pub min_distance_meters: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(5),
            min_distance_meters: 10.0,
        }
    }
}

/// Abstraction over "get permission", "get one fix", "stream fixes".
///
/// The production implementation wraps the platform location service and
/// lives outside this crate; tests and desktop builds use
/// [`super::simulated::SimulatedLocationProvider`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Prompts for foreground location access.
    async fn request_foreground_permission(&self) -> Result<(), LocationError>;

    /// Prompts for background location access.
    async fn request_background_permission(&self) -> Result<(), LocationError>;

    /// One-shot position read.
    async fn current_fix(&self) -> Result<Fix, LocationError>;

    /// Continuous rate-limited fixes while the app is foregrounded.
    ///
    /// Fails with `PermissionDenied` when foreground access was refused,
    /// instead of silently producing an empty stream.
    async fn watch(&self, options: WatchOptions) -> Result<FixStream, LocationError>;
}

/// OR-gate rate limiter for watch streams.
///
/// A fix passes when the minimum interval has elapsed OR the device moved
/// at least the minimum distance; either gate alone is sufficient. The
/// first fix always passes.
#[derive(Debug)]
pub struct FixGate {
    min_interval: Duration,
    min_distance_meters: f64,
    last: Option<(Fix, Instant)>,
}

impl FixGate {
    pub fn new(options: WatchOptions) -> Self {
        Self {
            min_interval: options.min_interval,
            min_distance_meters: options.min_distance_meters,
            last: None,
        }
    }

    pub fn accept(&mut self, fix: &Fix) -> bool {
        self.accept_at(fix, Instant::now())
    }

    pub fn accept_at(&mut self, fix: &Fix, now: Instant) -> bool {
        let pass = match &self.last {
            None => true,
            Some((prev, at)) => {
                now.duration_since(*at) >= self.min_interval
                    || prev.distance_meters(fix) >= self.min_distance_meters
            }
        };
        if pass {
            self.last = Some((*fix, now));
        }
        pass
    }
}
