//! In-process location provider for tests and desktop development builds.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::LocationError;
use crate::models::location::Fix;
use crate::services::location_provider::{FixGate, FixStream, LocationProvider, WatchOptions};

/// Location provider driven by explicit position updates.
///
/// Permission outcomes are fixed at construction. `set_position` moves the
/// simulated device; each active watcher receives the new fix if its own
/// rate gate lets it through. Closed watch streams are pruned lazily on
/// the next update.
pub struct SimulatedLocationProvider {
    foreground_granted: bool,
    background_granted: bool,
    position: Mutex<Fix>,
    watchers: Mutex<Vec<(FixGate, mpsc::Sender<Fix>)>>,
}

impl SimulatedLocationProvider {
    pub fn new(initial: Fix, foreground_granted: bool, background_granted: bool) -> Self {
        Self {
            foreground_granted,
            background_granted,
            position: Mutex::new(initial),
            watchers: Mutex::new(Vec::new()),
        }
    }

    /// Provider with both permissions granted.
    pub fn granted(initial: Fix) -> Self {
        Self::new(initial, true, true)
    }

    /// Provider that refuses all location access.
    pub fn denied() -> Self {
        Self::new(Fix::new(0.0, 0.0), false, false)
    }

    /// Moves the simulated device and offers the fix to every watcher.
    pub fn set_position(&self, fix: Fix) {
        *self.position.lock().unwrap_or_else(|e| e.into_inner()) = fix;

        let mut watchers = self.watchers.lock().unwrap_or_else(|e| e.into_inner());
        watchers.retain(|(_, tx)| !tx.is_closed());
        for (gate, tx) in watchers.iter_mut() {
            if gate.accept(&fix) {
                // A full buffer means the consumer is behind; dropping the
                // fix is fine, the row is overwritten by the next one.
                let _ = tx.try_send(fix);
            }
        }
    }

    fn current_position(&self) -> Fix {
        *self.position.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LocationProvider for SimulatedLocationProvider {
    async fn request_foreground_permission(&self) -> Result<(), LocationError> {
        if self.foreground_granted {
            Ok(())
        } else {
            Err(LocationError::PermissionDenied)
        }
    }

    async fn request_background_permission(&self) -> Result<(), LocationError> {
        if self.background_granted {
            Ok(())
        } else {
            Err(LocationError::PermissionDenied)
        }
    }

    async fn current_fix(&self) -> Result<Fix, LocationError> {
        if !self.foreground_granted {
            return Err(LocationError::PermissionDenied);
        }
        Ok(self.current_position())
    }

    async fn watch(&self, options: WatchOptions) -> Result<FixStream, LocationError> {
        if !self.foreground_granted {
            return Err(LocationError::PermissionDenied);
        }
        let (tx, rx) = mpsc::channel(16);
        self.watchers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((FixGate::new(options), tx));
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn denied_provider_refuses_watch() {
        let provider = SimulatedLocationProvider::denied();
        let err = provider.watch(WatchOptions::default()).await.unwrap_err();
        assert!(matches!(err, LocationError::PermissionDenied));
    }

    #[tokio::test]
    async fn watcher_receives_moves_past_the_gate() {
        let provider = SimulatedLocationProvider::granted(Fix::new(-6.2000, 106.8000));
        let mut stream = provider.watch(WatchOptions::default()).await.unwrap();

        // First fix always passes; the second is ~55 m away so the
        // distance gate opens even though no time has passed.
        provider.set_position(Fix::new(-6.2000, 106.8000));
        provider.set_position(Fix::new(-6.2005, 106.8000));

        assert_eq!(stream.recv().await.unwrap(), Fix::new(-6.2000, 106.8000));
        assert_eq!(stream.recv().await.unwrap(), Fix::new(-6.2005, 106.8000));
    }

    #[tokio::test]
    async fn small_quick_moves_are_suppressed() {
        let provider = SimulatedLocationProvider::granted(Fix::new(-6.2000, 106.8000));
        let mut stream = provider
            .watch(WatchOptions {
                min_interval: Duration::from_secs(60),
                min_distance_meters: 10.0,
            })
            .await
            .unwrap();

        provider.set_position(Fix::new(-6.2000, 106.8000));
        provider.set_position(Fix::new(-6.20005, 106.8000)); // ~5 m

        assert_eq!(stream.recv().await.unwrap(), Fix::new(-6.2000, 106.8000));
        assert!(stream.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_stream_is_pruned() {
        let provider = SimulatedLocationProvider::granted(Fix::new(-6.2, 106.8));
        let stream = provider.watch(WatchOptions::default()).await.unwrap();
        drop(stream);
        provider.set_position(Fix::new(-6.3, 106.9));
        assert!(provider
            .watchers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty());
    }
}
