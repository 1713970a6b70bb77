//! Process-wide counters for quote monitoring.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Quote service metrics.
pub struct QuoteMetrics {
    /// Quotes returned successfully.
    pub quotes_served: AtomicU64,
    /// Quotes that ended in an error.
    pub quotes_failed: AtomicU64,
    /// Rate lookups answered by the cache.
    pub cache_hits: AtomicU64,
    /// Rate lookups that went to the remote source.
    pub cache_misses: AtomicU64,
    /// Remote fetches that failed.
    pub rate_fetch_failures: AtomicU64,
    /// Requests rejected before reaching the service.
    pub validation_rejections: AtomicU64,
    /// Debug-mode requests.
    pub debug_requests: AtomicU64,
}

impl QuoteMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self {
            quotes_served: AtomicU64::new(0),
            quotes_failed: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            rate_fetch_failures: AtomicU64::new(0),
            validation_rejections: AtomicU64::new(0),
            debug_requests: AtomicU64::new(0),
        }
    }

    pub fn quote_served(&self) {
        self.quotes_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn quote_failed(&self) {
        self.quotes_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rate_fetch_failed(&self) {
        self.rate_fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn validation_rejected(&self) {
        self.validation_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a debug request and return the running total, including this one.
    pub fn debug_request(&self) -> u64 {
        self.debug_requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> QuoteMetricsSnapshot {
        QuoteMetricsSnapshot {
            quotes_served: self.quotes_served.load(Ordering::Relaxed),
            quotes_failed: self.quotes_failed.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            rate_fetch_failures: self.rate_fetch_failures.load(Ordering::Relaxed),
            validation_rejections: self.validation_rejections.load(Ordering::Relaxed),
            debug_requests: self.debug_requests.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            r#"# HELP fxquote_quotes_served_total Quotes returned successfully
# TYPE fxquote_quotes_served_total counter
fxquote_quotes_served_total {}

# HELP fxquote_quotes_failed_total Quotes that ended in an error
# TYPE fxquote_quotes_failed_total counter
fxquote_quotes_failed_total {}

# HELP fxquote_cache_hits_total Rate lookups answered from cache
# TYPE fxquote_cache_hits_total counter
fxquote_cache_hits_total {}

# HELP fxquote_cache_misses_total Rate lookups sent to the remote source
# TYPE fxquote_cache_misses_total counter
fxquote_cache_misses_total {}

# HELP fxquote_rate_fetch_failures_total Failed remote rate fetches
# TYPE fxquote_rate_fetch_failures_total counter
fxquote_rate_fetch_failures_total {}

# HELP fxquote_validation_rejections_total Requests rejected by input validation
# TYPE fxquote_validation_rejections_total counter
fxquote_validation_rejections_total {}

# HELP fxquote_debug_requests_total Debug-mode quote requests
# TYPE fxquote_debug_requests_total counter
fxquote_debug_requests_total {}
"#,
            snapshot.quotes_served,
            snapshot.quotes_failed,
            snapshot.cache_hits,
            snapshot.cache_misses,
            snapshot.rate_fetch_failures,
            snapshot.validation_rejections,
            snapshot.debug_requests,
        )
    }
}

impl Default for QuoteMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteMetricsSnapshot {
    pub quotes_served: u64,
    pub quotes_failed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub rate_fetch_failures: u64,
    pub validation_rejections: u64,
    pub debug_requests: u64,
}

/// Shared metrics instance.
pub type SharedQuoteMetrics = Arc<QuoteMetrics>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_request_counter() {
        let metrics = QuoteMetrics::new();

        assert_eq!(metrics.debug_request(), 1);
        assert_eq!(metrics.debug_request(), 2);
        assert_eq!(metrics.snapshot().debug_requests, 2);
    }

    #[test]
    fn test_debug_counter_is_atomic_across_threads() {
        let metrics = Arc::new(QuoteMetrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.debug_request();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.snapshot().debug_requests, 8000);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = QuoteMetrics::new();
        metrics.cache_hit();
        metrics.cache_miss();
        metrics.cache_miss();

        let output = metrics.to_prometheus();
        assert!(output.contains("fxquote_cache_hits_total 1"));
        assert!(output.contains("fxquote_cache_misses_total 2"));
        assert!(output.contains("fxquote_debug_requests_total 0"));
    }
}
