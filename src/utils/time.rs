//! Civil-time helpers for the configured zone.
//!
//! Every timestamp persisted to the store is civil time in a single fixed
//! zone (Asia/Jakarta in production), rendered by [`format_civil`]. The
//! external store keeps the literal string as-is and does not normalize
//! zones, so the format here is the wire format.

use chrono::{DateTime, ParseError, Utc};
use chrono_tz::Tz;

/// Wire format for persisted timestamps: `YYYY-MM-DDTHH:mm:ss+07:00`.
pub const CIVIL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Returns the current time in the configured timezone.
pub fn now_in_timezone(tz: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(tz)
}

/// Renders a timestamp in the exact literal format the store expects.
pub fn format_civil(ts: &DateTime<Tz>) -> String {
    ts.format(CIVIL_FORMAT).to_string()
}

/// Parses a stored civil timestamp back into the configured zone.
pub fn parse_civil(s: &str, tz: &Tz) -> Result<DateTime<Tz>, ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(tz))
}

/// Source of current time for everything the core persists.
///
/// Injected so tests can pin the clock; production uses [`SystemClock`].
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Tz>;
}

/// Wall-clock time source in a fixed zone.
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        now_in_timezone(&self.tz)
    }
}
