//! Quote request and response types.

use fxquote_common::{Currency, CurrencyPair};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::cache::KeyExpiry;
use crate::rounding::RoundingPolicy;

/// Decimal places of the exchange rate shown to callers.
pub const DISPLAY_RATE_DECIMALS: u32 = 3;

/// A validated request to convert `amount` of `base` into `quote`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRequest {
    pub base: Currency,
    pub quote: Currency,
    /// Positive, finite amount of the base currency.
    pub amount: f64,
}

impl QuoteRequest {
    pub fn new(base: Currency, quote: Currency, amount: f64) -> Self {
        Self { base, quote, amount }
    }

    /// The cache key for this request.
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.base.clone(), self.quote.clone())
    }
}

/// A priced quote, optionally carrying diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Rate used, rounded for display.
    pub exchange_rate: f64,
    /// Converted amount after rounding.
    pub quote_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_info: Option<CacheInfo>,
}

/// Per-request diagnostics attached in debug mode.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    /// Converted amount before rounding.
    pub raw_quote_amount: f64,
    pub rounding_policy: RoundingPolicy,
    pub response_time_ms: u64,
    /// Whether the rate came from the cache.
    pub cached: bool,
    /// Debug requests served by this process, including this one.
    pub total_requests: u64,
}

/// Snapshot of the rate cache.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    pub size: usize,
    pub capacity: usize,
    pub utilization_percentage: f64,
    pub most_recently_cached: Option<String>,
    pub least_recently_cached: Option<String>,
    /// Keys from most to least recently used.
    pub cache_order: Vec<String>,
    pub expiry_data: Vec<KeyExpiry<String>>,
}

/// Round a rate to [`DISPLAY_RATE_DECIMALS`] places, ties away from zero.
///
/// Rounds the exact binary value of `rate`, so `0.1235` (stored just below
/// the tie) becomes `0.123`.
pub fn display_rate(rate: f64) -> f64 {
    Decimal::from_f64_retain(rate)
        .map(|d| {
            d.round_dp_with_strategy(DISPLAY_RATE_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
        })
        .and_then(|d| d.to_f64())
        .unwrap_or(rate)
}
