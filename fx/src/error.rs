//! FX quote error types.

use fxquote_common::Currency;
use thiserror::Error;

/// Errors that can occur while producing a quote.
#[derive(Debug, Error)]
pub enum FxError {
    /// Currency is not part of the supported set.
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(Currency),

    /// Remote rate source was unreachable, timed out, or returned unusable data.
    #[error("Rate fetch failed: {0}")]
    RateFetch(String),

    /// Rounding policy name is not recognised.
    #[error("Unknown rounding policy: {0}")]
    InvalidPolicy(String),
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
