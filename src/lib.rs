//! Presence and session lifecycle core for the field voting client.
//!
//! Owns two invariants for the signed-in user: at most one active session
//! row, and at most one current-location row, both keyed by user id in the
//! backing store. Two independent producers feed the location row: a
//! foreground watcher and an OS-scheduled background task. Both are torn
//! down consistently on logout.
//!
//! Screens, navigation, and the credential check live outside this crate;
//! they consume [`services::SessionLifecycle`] through `login`, `logout`,
//! `restore`, and `current_user_id`.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod types;
pub mod utils;

pub use config::Config;
pub use error::{LifecycleError, LocationError, StoreError};
pub use services::SessionLifecycle;
