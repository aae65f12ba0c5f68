//! Typed errors surfaced by the session lifecycle core.
//!
//! Producer callbacks (foreground fix delivery, background invocations)
//! never propagate errors; they log and swallow at the boundary. Only the
//! orchestration entry points (`login`, `logout`, `restore`) return these
//! to the presentation layer.

use thiserror::Error;

/// Failure talking to the backing record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected or failed the request.
    #[error("store backend error: {0}")]
    Backend(#[from] sqlx::Error),
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A persisted row could not be decoded back into a model.
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Failure from the device location service.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The user declined location access.
    #[error("location permission denied")]
    PermissionDenied,
    /// The location service failed or produced no fix.
    #[error("location service unavailable: {0}")]
    Unavailable(String),
}

/// Orchestration errors returned by `login`/`logout`/`restore`.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Location access was refused; login must not proceed without it.
    #[error("location permission denied")]
    PermissionDenied,
    /// A fatal store round trip failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The location service failed at a point where that is fatal.
    #[error(transparent)]
    Location(LocationError),
}

impl From<LocationError> for LifecycleError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::PermissionDenied => LifecycleError::PermissionDenied,
            other => LifecycleError::Location(other),
        }
    }
}
