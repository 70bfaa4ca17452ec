use chrono::{DateTime, Utc};

/// Reference instant the gateway counts its timestamps from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Epoch {
    unix_seconds: i64,
}

/// 2000-01-01T00:00:00Z
pub const GATEWAY_EPOCH: Epoch = Epoch::from_unix_seconds(946_684_800);

impl Epoch {
    pub const fn from_unix_seconds(unix_seconds: i64) -> Self {
        Epoch { unix_seconds }
    }

    /// Returns the instant `seconds` after the epoch, if representable.
    pub fn plus_seconds(&self, seconds: u64) -> Option<DateTime<Utc>> {
        let offset = i64::try_from(seconds).ok()?;
        DateTime::from_timestamp(self.unix_seconds.checked_add(offset)?, 0)
    }

    /// Whole seconds from the epoch to `instant`; `None` before the epoch.
    pub fn seconds_until(&self, instant: &DateTime<Utc>) -> Option<u64> {
        u64::try_from(instant.timestamp() - self.unix_seconds).ok()
    }
}
