//! Wire-level timestamp and duration. Semantic values only — neither is
//! coupled to a monotonic clock.

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    /// Whole seconds.
    pub seconds: u64,
    /// Nanoseconds, always `< 1_000_000_000`.
    pub nanos: u32,
}

impl Timestamp {
    /// Builds a timestamp, wrapping any `nanos >= 1_000_000_000` into `seconds`.
    pub fn new(seconds: u64, nanos: u32) -> Self {
        let extra_seconds = (nanos / 1_000_000_000) as u64;
        Self { seconds: seconds + extra_seconds, nanos: nanos % 1_000_000_000 }
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        let dur = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        Self { seconds: dur.as_secs(), nanos: dur.subsec_nanos() }
    }

    /// Adds a whole number of nanoseconds, carrying into seconds.
    pub fn plus_nanos(self, nanos: u64) -> Self {
        let total = self.nanos as u64 + nanos;
        Self::new(self.seconds + total / 1_000_000_000, (total % 1_000_000_000) as u32)
    }

    /// Subtracts whole seconds, saturating at zero.
    pub fn minus_seconds(self, seconds: u64) -> Self {
        Self { seconds: self.seconds.saturating_sub(seconds), nanos: self.nanos }
    }

    /// Adds a [`Duration`].
    pub fn plus_duration(self, duration: Duration) -> Self {
        Self { seconds: self.seconds + duration.seconds, nanos: self.nanos }
    }
}

/// A duration expressed in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    /// Whole seconds.
    pub seconds: u64,
}

impl Duration {
    /// Builds a duration from whole seconds.
    pub fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    /// The default transaction valid duration (120 s, spec §3).
    pub fn default_transaction_valid() -> Self {
        Self::from_secs(120)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nanos_overflow_carries_into_seconds() {
        let ts = Timestamp::new(10, 1_500_000_000);
        assert_eq!(ts, Timestamp { seconds: 11, nanos: 500_000_000 });
    }

    #[test]
    fn plus_nanos_carries() {
        let ts = Timestamp::new(10, 900_000_000).plus_nanos(200_000_000);
        assert_eq!(ts, Timestamp { seconds: 11, nanos: 100_000_000 });
    }

    #[test]
    fn default_valid_duration_is_120s() {
        assert_eq!(Duration::default_transaction_valid(), Duration::from_secs(120));
    }
}
