//! Quote service: cache lookup, fallback fetch, conversion and rounding.

use std::sync::Arc;
use std::time::Duration;

use fxquote_common::{as_millis_u64, Currency, CurrencyPair, SupportedCurrencies};
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::cache::{ExpiringLruCache, KeyExpiry};
use crate::conversion::{display_rate, CacheInfo, DebugInfo, Quote, QuoteRequest};
use crate::error::{FxError, FxResult};
use crate::metrics::{QuoteMetrics, SharedQuoteMetrics};
use crate::provider::RateFetcher;
use crate::rounding::{round, RoundingPolicy};

/// Decimal places of the quoted amount (whole units).
pub const QUOTE_AMOUNT_DECIMALS: i32 = 0;

/// Configuration for the quote service.
#[derive(Debug, Clone)]
pub struct QuoteServiceConfig {
    /// Currencies that may be quoted; sizes the cache at N×(N−1).
    pub supported: SupportedCurrencies,
    /// Lifetime of a cached rate.
    pub cache_ttl: Duration,
    /// Policy used when the caller does not pick one.
    pub default_policy: RoundingPolicy,
}

impl Default for QuoteServiceConfig {
    fn default() -> Self {
        Self {
            supported: SupportedCurrencies::default(),
            cache_ttl: fxquote_common::constants::cache_ttl(),
            default_policy: RoundingPolicy::RoundHalfEven,
        }
    }
}

/// Prices currency conversions against a cached view of a remote rate table.
///
/// One instance is shared by every request handler. Cache reads and writes
/// each hold the cache mutex briefly; the remote fetch runs without it, so a
/// slow source only delays requests that missed.
pub struct QuoteService {
    fetcher: Arc<dyn RateFetcher>,
    cache: Mutex<ExpiringLruCache<CurrencyPair, f64>>,
    metrics: SharedQuoteMetrics,
    config: QuoteServiceConfig,
}

impl QuoteService {
    /// Create a new quote service with its own metrics.
    pub fn new(fetcher: Arc<dyn RateFetcher>, config: QuoteServiceConfig) -> Self {
        Self::with_metrics(fetcher, config, Arc::new(QuoteMetrics::new()))
    }

    /// Create a new quote service reporting into `metrics`.
    pub fn with_metrics(
        fetcher: Arc<dyn RateFetcher>,
        config: QuoteServiceConfig,
        metrics: SharedQuoteMetrics,
    ) -> Self {
        let capacity = config.supported.pair_count();
        info!(
            fetcher = fetcher.name(),
            reference = %fetcher.reference_currency(),
            capacity,
            ttl_ms = as_millis_u64(config.cache_ttl),
            "Quote service initialised"
        );

        Self {
            fetcher,
            cache: Mutex::new(ExpiringLruCache::new(capacity, config.cache_ttl)),
            metrics,
            config,
        }
    }

    pub fn supported_currencies(&self) -> &SupportedCurrencies {
        &self.config.supported
    }

    pub fn default_policy(&self) -> RoundingPolicy {
        self.config.default_policy
    }

    pub fn metrics(&self) -> &SharedQuoteMetrics {
        &self.metrics
    }

    /// Quote with the configured default rounding policy.
    pub async fn get_quote_default(&self, request: &QuoteRequest, debug: bool) -> FxResult<Quote> {
        self.get_quote(request, debug, self.config.default_policy).await
    }

    /// Price `request`, rounding the converted amount to whole units with `policy`.
    ///
    /// In debug mode the process-wide request counter is incremented and the
    /// quote carries per-request and cache diagnostics.
    #[instrument(
        skip(self, request, debug),
        fields(pair = %request.pair(), amount = request.amount, policy = %policy)
    )]
    pub async fn get_quote(
        &self,
        request: &QuoteRequest,
        debug: bool,
        policy: RoundingPolicy,
    ) -> FxResult<Quote> {
        let started = Instant::now();

        let (exchange_rate, cached) =
            match self.exchange_rate(&request.base, &request.quote).await {
                Ok(found) => found,
                Err(e) => {
                    self.metrics.quote_failed();
                    return Err(e);
                }
            };

        let raw_quote_amount = request.amount * exchange_rate;
        let quote_amount = round(raw_quote_amount, QUOTE_AMOUNT_DECIMALS, policy);

        let mut quote = Quote {
            exchange_rate: display_rate(exchange_rate),
            quote_amount,
            debug_info: None,
            cache_info: None,
        };

        if debug {
            let total_requests = self.metrics.debug_request();
            quote.debug_info = Some(DebugInfo {
                raw_quote_amount,
                rounding_policy: policy,
                response_time_ms: as_millis_u64(started.elapsed()),
                cached,
                total_requests,
            });
            quote.cache_info = Some(self.cache_info());
        }

        self.metrics.quote_served();
        debug!(rate = exchange_rate, quote_amount, cached, "Quote priced");
        Ok(quote)
    }

    /// Rate for `base -> quote` and whether it came from the cache.
    pub async fn exchange_rate(&self, base: &Currency, quote: &Currency) -> FxResult<(f64, bool)> {
        let pair = CurrencyPair::new(base.clone(), quote.clone());

        let cached = self.cache.lock().get(&pair);
        if let Some(rate) = cached {
            self.metrics.cache_hit();
            debug!(pair = %pair, "Cache hit");
            return Ok((rate, true));
        }

        self.metrics.cache_miss();
        debug!(pair = %pair, "Cache miss");

        for currency in [base, quote] {
            if !self.config.supported.contains(currency) {
                return Err(FxError::UnsupportedCurrency(currency.clone()));
            }
        }

        let table = self.fetcher.fetch_rates().await.map_err(|e| {
            self.metrics.rate_fetch_failed();
            warn!(pair = %pair, fetcher = self.fetcher.name(), error = %e, "Rate fetch failed");
            e
        })?;

        let rate = table.cross_rate(base, quote).map_err(|e| {
            self.metrics.rate_fetch_failed();
            warn!(pair = %pair, error = %e, "Rate table unusable");
            e
        })?;

        self.cache.lock().set(pair, rate);
        Ok((rate, false))
    }

    /// Diagnostic snapshot of the rate cache. Does not reorder entries.
    pub fn cache_info(&self) -> CacheInfo {
        let cache = self.cache.lock();
        let size = cache.len();
        let capacity = cache.capacity();

        CacheInfo {
            size,
            capacity,
            utilization_percentage: 100.0 * size as f64 / capacity as f64,
            most_recently_cached: cache.most_recent_key().map(|k| k.to_string()),
            least_recently_cached: cache.least_recent_key().map(|k| k.to_string()),
            cache_order: cache.ordered_keys().iter().map(ToString::to_string).collect(),
            expiry_data: cache
                .expirations()
                .into_iter()
                .map(|e| KeyExpiry {
                    key: e.key.to_string(),
                    is_expired: e.is_expired,
                    ms_until_expiration: e.ms_until_expiration,
                })
                .collect(),
        }
    }

    /// Drop expired rates from the cache, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let purged = self.cache.lock().purge_expired();
        if purged > 0 {
            debug!(purged, "Purged expired rates");
        }
        purged
    }
}
