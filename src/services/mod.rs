//! Session lifecycle orchestration and the capability seams it drives.

pub mod active_user;
pub mod background;
pub mod lifecycle;
pub mod location_provider;
pub mod location_writer;
pub mod scheduler;
pub mod simulated;
pub mod watcher;

pub use active_user::ActiveUserHandle;
pub use background::{BackgroundTrackingTask, BACKGROUND_LOCATION_TASK};
pub use lifecycle::SessionLifecycle;
pub use location_provider::{FixGate, FixStream, LocationProvider, WatchOptions};
pub use location_writer::LocationWriter;
pub use scheduler::{BackgroundScheduler, IntervalScheduler, TaskRegistration};
pub use simulated::SimulatedLocationProvider;
pub use watcher::Subscription;
