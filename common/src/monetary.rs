//! Currency types for FxQuote.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error raised when a string is not a well-formed ISO 4217 code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid currency code '{0}': expected three ASCII letters")]
pub struct CurrencyCodeError(pub String);

/// ISO 4217 currency code, always stored upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn ils() -> Self {
        Self::new("ILS")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl FromStr for Currency {
    type Err = CurrencyCodeError;

    /// Strict parse: the code must be exactly three ASCII letters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self::new(trimmed))
        } else {
            Err(CurrencyCodeError(s.to_string()))
        }
    }
}

/// An ordered conversion between two currencies.
///
/// This is the key of the exchange-rate cache, so `USD-EUR` and `EUR-USD`
/// are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Currency the amount is given in.
    pub base: Currency,
    /// Currency the amount is converted to.
    pub quote: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.quote)
    }
}

/// The fixed, ordered set of currencies the service quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedCurrencies(Vec<Currency>);

impl SupportedCurrencies {
    /// Build a set from the given codes, dropping duplicates but keeping order.
    pub fn new(currencies: impl IntoIterator<Item = Currency>) -> Self {
        let mut unique: Vec<Currency> = Vec::new();
        for currency in currencies {
            if !unique.contains(&currency) {
                unique.push(currency);
            }
        }
        Self(unique)
    }

    /// Check membership.
    pub fn contains(&self, currency: &Currency) -> bool {
        self.0.contains(currency)
    }

    /// Upper-case `code` and return it if it is supported.
    pub fn parse(&self, code: &str) -> Option<Currency> {
        let currency = Currency::new(code);
        self.contains(&currency).then_some(currency)
    }

    /// Number of supported currencies.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of ordered pairs with distinct base and quote: N×(N−1).
    pub fn pair_count(&self) -> usize {
        let n = self.0.len();
        n * n.saturating_sub(1)
    }

    /// Every ordered pair with distinct base and quote.
    pub fn pairs(&self) -> Vec<CurrencyPair> {
        self.0
            .iter()
            .flat_map(|base| {
                self.0
                    .iter()
                    .filter(move |quote| *quote != base)
                    .map(move |quote| CurrencyPair::new(base.clone(), quote.clone()))
            })
            .collect()
    }

    /// Codes joined for human-readable messages, e.g. `USD, EUR, GBP, ILS`.
    pub fn codes(&self) -> String {
        self.0
            .iter()
            .map(Currency::code)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for SupportedCurrencies {
    fn default() -> Self {
        Self::new([Currency::usd(), Currency::eur(), Currency::gbp(), Currency::ils()])
    }
}

impl FromStr for SupportedCurrencies {
    type Err = CurrencyCodeError;

    /// Parse a comma separated list such as `usd,eur, gbp`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let currencies = s
            .split(',')
            .filter(|code| !code.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Currency>, _>>()?;
        Ok(Self::new(currencies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_is_upper_cased() {
        assert_eq!(Currency::new("usd"), Currency::usd());
        assert_eq!(Currency::new(" eur ").code(), "EUR");
    }

    #[test]
    fn test_currency_strict_parse() {
        assert_eq!("gbp".parse::<Currency>().unwrap(), Currency::gbp());
        assert!("DOLLAR".parse::<Currency>().is_err());
        assert!("U5D".parse::<Currency>().is_err());
    }

    #[test]
    fn test_pair_display_is_ordered() {
        let pair = CurrencyPair::new(Currency::usd(), Currency::eur());
        assert_eq!(pair.to_string(), "USD-EUR");
        assert_ne!(pair, CurrencyPair::new(Currency::eur(), Currency::usd()));
    }

    #[test]
    fn test_default_supported_set() {
        let supported = SupportedCurrencies::default();
        assert_eq!(supported.len(), 4);
        assert_eq!(supported.pair_count(), 12);
        assert_eq!(supported.pairs().len(), 12);
        assert_eq!(supported.codes(), "USD, EUR, GBP, ILS");
    }

    #[test]
    fn test_supported_parse_normalises_case() {
        let supported = SupportedCurrencies::default();
        assert_eq!(supported.parse("ils"), Some(Currency::ils()));
        assert_eq!(supported.parse("INVALID"), None);
        assert_eq!(supported.parse("JPY"), None);
    }

    #[test]
    fn test_supported_from_list() {
        let supported: SupportedCurrencies = "usd, eur,usd,".parse().unwrap();
        assert_eq!(supported.len(), 2);
        assert_eq!(supported.pair_count(), 2);
        assert!("usd,euro".parse::<SupportedCurrencies>().is_err());
    }

    #[test]
    fn test_single_currency_has_no_pairs() {
        let supported = SupportedCurrencies::new([Currency::usd()]);
        assert_eq!(supported.pair_count(), 0);
        assert!(supported.pairs().is_empty());
    }
}
