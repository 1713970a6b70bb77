//! FxQuote FX Engine
//!
//! Currency conversion quotes backed by a bounded, time-expiring LRU cache
//! of exchange rates in front of a remote rate source.
//!
//! # Features
//!
//! - O(1) expiring LRU cache with read-only diagnostics
//! - Deterministic rounding policies for quoted amounts
//! - Pluggable rate source (HTTP or in-memory mock)
//! - Process-wide counters with Prometheus export
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fxquote_common::Currency;
//! use fxquote_fx::{HttpRateFetcher, QuoteRequest, QuoteService, QuoteServiceConfig};
//!
//! let fetcher = Arc::new(HttpRateFetcher::new(Default::default())?);
//! let service = QuoteService::new(fetcher, QuoteServiceConfig::default());
//!
//! let request = QuoteRequest::new(Currency::usd(), Currency::eur(), 10_000.0);
//! let quote = service.get_quote_default(&request, false).await?;
//! ```

pub mod cache;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod rounding;

pub use cache::{ExpiringLruCache, KeyExpiry};
pub use conversion::{CacheInfo, DebugInfo, Quote, QuoteRequest};
pub use engine::{QuoteService, QuoteServiceConfig};
pub use error::{FxError, FxResult};
pub use metrics::{QuoteMetrics, SharedQuoteMetrics};
pub use provider::{HttpRateFetcher, HttpRateFetcherConfig, RateFetcher, RateTable};
pub use rounding::{round, RoundingPolicy};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateFetcher;
