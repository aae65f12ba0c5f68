//! Data models shared between the lifecycle orchestration and the store
//! adapters.

pub mod location;
pub mod session;

pub use location::{CurrentLocation, Fix};
pub use session::Session;
