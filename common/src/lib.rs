//! FxQuote Common Types
//!
//! Shared types used across the FxQuote service: currency codes, the ordered
//! currency pair that keys the rate cache, the supported-currency set and
//! timing constants.

pub mod monetary;
pub mod time;

pub use monetary::*;
pub use time::*;
