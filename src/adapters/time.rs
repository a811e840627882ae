//! Wall-clock adapter.
//!
//! `chrono::Utc::now()` over the system clock, which on the device is only
//! meaningful once SNTP has synced it — the ESP boots at the Unix epoch.
//! The telemetry adapter withholds submissions whose timestamp fails
//! [`is_synced`], so near-epoch records never reach the store.

use chrono::{DateTime, Utc};

/// Timestamps before this are obviously unsynced (2020-01-01 UTC).
const EPOCH_2020: i64 = 1_577_836_800;

/// Whether a timestamp looks like post-SNTP wall-clock time.
pub fn is_synced(at: DateTime<Utc>) -> bool {
    at.timestamp() >= EPOCH_2020
}

pub struct TimeAdapter;

impl Default for TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Current UTC wall-clock instant.
    pub fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn epoch_boot_time_is_not_synced() {
        let boot = Utc.timestamp_opt(0, 0).unwrap();
        assert!(!is_synced(boot));
    }

    #[test]
    fn host_clock_is_synced() {
        assert!(is_synced(TimeAdapter::new().now_utc()));
    }
}
