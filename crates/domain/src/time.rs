//! Time and timestamp helpers.
//!
//! Gating arithmetic is done on epoch milliseconds; `0` means "never".

use std::time::Duration;

use chrono::Utc;

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// Return the current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> Millis {
    Utc::now().timestamp_millis()
}

/// Convert a [`Duration`] to signed milliseconds, saturating at `i64::MAX`.
#[must_use]
pub fn duration_millis(duration: Duration) -> Millis {
    Millis::try_from(duration.as_millis()).unwrap_or(Millis::MAX)
}
