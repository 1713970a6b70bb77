//! Timing constants for FxQuote.

/// Service timing constants.
pub mod constants {
    use std::time::Duration;

    /// Lifetime of a cached exchange rate (10 seconds).
    pub fn cache_ttl() -> Duration {
        Duration::from_secs(10)
    }

    /// Upper bound on a single call to the remote rate source (5 seconds).
    pub fn rate_fetch_timeout() -> Duration {
        Duration::from_secs(5)
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub fn as_millis_u64(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        assert_eq!(constants::cache_ttl(), Duration::from_secs(10));
        assert!(constants::rate_fetch_timeout() < constants::cache_ttl());
    }

    #[test]
    fn test_as_millis() {
        assert_eq!(as_millis_u64(Duration::from_micros(2_999)), 2);
        assert_eq!(as_millis_u64(Duration::MAX), u64::MAX);
    }
}
