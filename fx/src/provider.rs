//! Rate source traits and implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fxquote_common::Currency;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FxError, FxResult};

/// Default remote source of USD-referenced rates.
pub const DEFAULT_RATE_API_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

/// A table of `currency -> rate` against a single reference currency.
#[derive(Debug, Clone)]
pub struct RateTable {
    /// Currency every rate is expressed against.
    pub reference: Currency,
    /// Units of each currency per one unit of the reference currency.
    pub rates: HashMap<Currency, f64>,
    /// When the table was retrieved.
    pub fetched_at: DateTime<Utc>,
}

impl RateTable {
    /// Create a table stamped with the current time.
    pub fn new(reference: Currency, rates: HashMap<Currency, f64>) -> Self {
        Self {
            reference,
            rates,
            fetched_at: Utc::now(),
        }
    }

    /// Rate of `currency` against the reference currency.
    ///
    /// The reference currency is always 1. A missing, non-finite or
    /// non-positive rate is treated as malformed data.
    pub fn rate_for(&self, currency: &Currency) -> FxResult<f64> {
        if *currency == self.reference {
            return Ok(1.0);
        }

        match self.rates.get(currency) {
            Some(&rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
            Some(&rate) => Err(FxError::RateFetch(format!(
                "invalid rate {rate} for {currency}"
            ))),
            None => Err(FxError::RateFetch(format!(
                "rate for {currency} missing from {} table",
                self.reference
            ))),
        }
    }

    /// Cross rate: units of `quote` per unit of `base`.
    pub fn cross_rate(&self, base: &Currency, quote: &Currency) -> FxResult<f64> {
        Ok(self.rate_for(quote)? / self.rate_for(base)?)
    }
}

/// Trait for sources of exchange-rate tables.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    /// Get the fetcher name.
    fn name(&self) -> &str;

    /// Currency the fetched table is referenced to.
    fn reference_currency(&self) -> &Currency;

    /// Fetch the current rate table.
    async fn fetch_rates(&self) -> FxResult<RateTable>;
}

/// Configuration for [`HttpRateFetcher`].
#[derive(Debug, Clone)]
pub struct HttpRateFetcherConfig {
    /// Endpoint returning the latest rates.
    pub api_url: String,
    /// Reference currency of the endpoint.
    pub reference_currency: Currency,
    /// Timeout for the whole request.
    pub timeout: Duration,
}

impl Default for HttpRateFetcherConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_RATE_API_URL.to_string(),
            reference_currency: Currency::usd(),
            timeout: fxquote_common::constants::rate_fetch_timeout(),
        }
    }
}

/// Body of the `/latest/<base>` endpoint; extra fields are ignored.
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    base: Option<String>,
    rates: HashMap<String, f64>,
}

/// Fetches rate tables over HTTP from an exchangerate-api compatible endpoint.
pub struct HttpRateFetcher {
    client: reqwest::Client,
    config: HttpRateFetcherConfig,
}

impl HttpRateFetcher {
    /// Create a new fetcher.
    pub fn new(config: HttpRateFetcherConfig) -> FxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FxError::RateFetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn parse_table(&self, body: LatestRatesResponse) -> FxResult<RateTable> {
        if let Some(base) = body.base.as_deref() {
            let base = Currency::new(base);
            if base != self.config.reference_currency {
                return Err(FxError::RateFetch(format!(
                    "expected rates referenced to {}, got {}",
                    self.config.reference_currency, base
                )));
            }
        }

        let rates = body
            .rates
            .into_iter()
            .map(|(code, rate)| (Currency::new(code), rate))
            .collect();

        Ok(RateTable::new(self.config.reference_currency.clone(), rates))
    }
}

#[async_trait]
impl RateFetcher for HttpRateFetcher {
    fn name(&self) -> &str {
        "exchangerate-api"
    }

    fn reference_currency(&self) -> &Currency {
        &self.config.reference_currency
    }

    async fn fetch_rates(&self) -> FxResult<RateTable> {
        let url = &self.config.api_url;
        debug!(url = %url, "Fetching rate table");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!(url = %url, error = %e, timeout = e.is_timeout(), "Rate request failed");
                FxError::RateFetch(e.to_string())
            })?;

        let body: LatestRatesResponse = response.json().await.map_err(|e| {
            warn!(url = %url, error = %e, "Rate response could not be decoded");
            FxError::RateFetch(format!("malformed rate response: {e}"))
        })?;

        let table = self.parse_table(body)?;
        debug!(
            reference = %table.reference,
            currencies = table.rates.len(),
            "Fetched rate table"
        );
        Ok(table)
    }
}

/// Mock rate fetcher for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateFetcher {
    reference: Currency,
    rates: parking_lot::RwLock<HashMap<Currency, f64>>,
    failure: parking_lot::RwLock<Option<String>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateFetcher {
    /// Create a mock referenced to `reference` with no rates.
    pub fn new(reference: Currency) -> Self {
        Self {
            reference,
            rates: parking_lot::RwLock::new(HashMap::new()),
            failure: parking_lot::RwLock::new(None),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// USD-referenced mock with `EUR 0.9`, `GBP 0.8`, `ILS 3.7`.
    pub fn with_default_rates() -> Self {
        let mock = Self::new(Currency::usd());
        mock.set_rate(Currency::usd(), 1.0);
        mock.set_rate(Currency::eur(), 0.9);
        mock.set_rate(Currency::gbp(), 0.8);
        mock.set_rate(Currency::ils(), 3.7);
        mock
    }

    /// Set a rate against the reference currency.
    pub fn set_rate(&self, currency: Currency, rate: f64) {
        self.rates.write().insert(currency, rate);
    }

    /// Make every following fetch fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write() = Some(message.into());
    }

    /// Let fetches succeed again.
    pub fn recover(&self) {
        *self.failure.write() = None;
    }

    /// Number of `fetch_rates` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateFetcher for MockRateFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    fn reference_currency(&self) -> &Currency {
        &self.reference
    }

    async fn fetch_rates(&self) -> FxResult<RateTable> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let failure = self.failure.read().clone();
        if let Some(message) = failure {
            return Err(FxError::RateFetch(message));
        }
        let rates = self.rates.read().clone();
        Ok(RateTable::new(self.reference.clone(), rates))
    }
}
