//! Single-writer funnel for current-location upserts.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::models::location::{CurrentLocation, Fix};
use crate::repositories::SessionStore;
use crate::types::UserId;
use crate::utils::time::Clock;

/// Serializes location writes from both producers onto one store call at a
/// time.
///
/// The foreground watcher and the background task both feed this funnel
/// instead of touching the store directly. Ordering between the two stays
/// arrival order (last write wins); the funnel only prevents interleaved
/// store calls, it does not gate on fix timestamps.
pub struct LocationWriter {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    gate: Mutex<()>,
}

impl LocationWriter {
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            gate: Mutex::new(()),
        }
    }

    /// Stamps the fix with the current civil time and upserts the user's
    /// current-location row.
    pub async fn write_fix(&self, user_id: UserId, fix: &Fix) -> Result<(), StoreError> {
        let _guard = self.gate.lock().await;
        let location = CurrentLocation {
            user_id,
            latitude: fix.latitude,
            longitude: fix.longitude,
            timestamp: self.clock.now(),
        };
        self.store.upsert_location(&location).await
    }
}
