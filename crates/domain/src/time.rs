//! Time and timestamp helpers.

use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// UTC timestamp attached to every event.
pub type Timestamp = DateTime<Utc>;

/// Wall-clock time in the controller's local timezone, as carried by clock ticks.
pub type LocalDateTime = NaiveDateTime;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return the current local wall-clock time.
#[must_use]
pub fn local_now() -> LocalDateTime {
    Local::now().naive_local()
}
