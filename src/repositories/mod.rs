pub mod postgres;
pub mod session_store;

pub use postgres::PgSessionStore;
pub use session_store::SessionStore;
