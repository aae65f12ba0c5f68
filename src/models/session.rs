//! Model for the per-user session row.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::types::UserId;

/// One user's login interval, keyed by user id in the store.
///
/// At most one row exists per user: the upsert key is `user_id`, so a new
/// login overwrites the previous row rather than appending. An active row
/// carries `login_time`; an inactive one carries `logout_time`.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: UserId,
    /// Display credential (service number) shown next to the user.
    pub username: String,
    pub login_time: Option<DateTime<Tz>>,
    pub logout_time: Option<DateTime<Tz>>,
    pub is_active: bool,
}

impl Session {
    /// Row written when a user signs in.
    pub fn logged_in(user_id: UserId, username: impl Into<String>, at: DateTime<Tz>) -> Self {
        Self {
            user_id,
            username: username.into(),
            login_time: Some(at),
            logout_time: None,
            is_active: true,
        }
    }

    /// Row written when a user signs out. Replaces the whole row, so the
    /// previous login time is dropped along with the active flag.
    pub fn logged_out(user_id: UserId, username: impl Into<String>, at: DateTime<Tz>) -> Self {
        Self {
            user_id,
            username: username.into(),
            login_time: None,
            logout_time: Some(at),
            is_active: false,
        }
    }
}
