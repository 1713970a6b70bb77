//! Server configuration.

use std::time::Duration;

use fxquote_common::{constants, Currency, SupportedCurrencies};
use fxquote_fx::provider::DEFAULT_RATE_API_URL;
use fxquote_fx::{HttpRateFetcherConfig, QuoteServiceConfig, RoundingPolicy};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// The assembled configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Remote endpoint serving the rate table.
    pub rate_api_url: String,
    /// Currency the remote table is referenced to.
    pub reference_currency: Currency,
    /// Timeout for one remote fetch.
    pub rate_fetch_timeout: Duration,
    /// Lifetime of a cached rate.
    pub cache_ttl: Duration,
    /// Currencies accepted by `/quote`.
    pub supported_currencies: SupportedCurrencies,
    /// Rounding policy when the request names none.
    pub default_policy: RoundingPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 3333,
            log_level: "info".to_string(),
            rate_api_url: DEFAULT_RATE_API_URL.to_string(),
            reference_currency: Currency::usd(),
            rate_fetch_timeout: constants::rate_fetch_timeout(),
            cache_ttl: constants::cache_ttl(),
            supported_currencies: SupportedCurrencies::default(),
            default_policy: RoundingPolicy::RoundHalfEven,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = lookup("QUOTE_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Some(port) = lookup("QUOTE_LISTEN_PORT") {
            config.listen_port = parse_env("QUOTE_LISTEN_PORT", &port)?;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(url) = lookup("RATE_API_URL") {
            config.rate_api_url = url;
        }

        if let Some(ms) = lookup("RATE_FETCH_TIMEOUT_MS") {
            config.rate_fetch_timeout =
                Duration::from_millis(parse_env("RATE_FETCH_TIMEOUT_MS", &ms)?);
        }

        if let Some(ms) = lookup("CACHE_TTL_MS") {
            config.cache_ttl = Duration::from_millis(parse_env("CACHE_TTL_MS", &ms)?);
        }

        if let Some(codes) = lookup("SUPPORTED_CURRENCIES") {
            config.supported_currencies = parse_env("SUPPORTED_CURRENCIES", &codes)?;
        }

        if let Some(policy) = lookup("DEFAULT_ROUNDING_POLICY") {
            config.default_policy = parse_env("DEFAULT_ROUNDING_POLICY", &policy)?;
        }

        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_port == 0 {
            return Err(ConfigError::Invalid("Listen port cannot be 0".to_string()));
        }

        if self.rate_api_url.is_empty() {
            return Err(ConfigError::Invalid("Rate API URL cannot be empty".to_string()));
        }

        if self.supported_currencies.len() < 2 {
            return Err(ConfigError::Invalid(
                "At least two supported currencies are required".to_string(),
            ));
        }

        if !self.supported_currencies.contains(&self.reference_currency) {
            return Err(ConfigError::Invalid(format!(
                "Reference currency {} must be supported",
                self.reference_currency
            )));
        }

        if self.cache_ttl.is_zero() {
            return Err(ConfigError::Invalid("Cache TTL cannot be zero".to_string()));
        }

        if self.rate_fetch_timeout.is_zero() {
            return Err(ConfigError::Invalid("Rate fetch timeout cannot be zero".to_string()));
        }

        Ok(())
    }

    /// `addr:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listen_addr, self.listen_port)
    }

    pub fn quote_service_config(&self) -> QuoteServiceConfig {
        QuoteServiceConfig {
            supported: self.supported_currencies.clone(),
            cache_ttl: self.cache_ttl,
            default_policy: self.default_policy,
        }
    }

    pub fn fetcher_config(&self) -> HttpRateFetcherConfig {
        HttpRateFetcherConfig {
            api_url: self.rate_api_url.clone(),
            reference_currency: self.reference_currency.clone(),
            timeout: self.rate_fetch_timeout,
        }
    }
}

fn parse_env<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl, Duration::from_secs(10));
        assert_eq!(config.quote_service_config().supported.pair_count(), 12);
        assert_eq!(config.fetcher_config().reference_currency, Currency::usd());
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("QUOTE_LISTEN_PORT", "8080"),
            ("CACHE_TTL_MS", "2500"),
            ("SUPPORTED_CURRENCIES", "usd,eur,gbp"),
            ("DEFAULT_ROUNDING_POLICY", "truncate"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.cache_ttl, Duration::from_millis(2500));
        assert_eq!(config.supported_currencies.pair_count(), 6);
        assert_eq!(config.default_policy, RoundingPolicy::Truncate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let err = ServerConfig::from_lookup(lookup(&[("QUOTE_LISTEN_PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "QUOTE_LISTEN_PORT", .. }));

        let err = ServerConfig::from_lookup(lookup(&[("DEFAULT_ROUNDING_POLICY", "bankers")]))
            .unwrap_err();
        assert!(err.to_string().contains("bankers"));
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ServerConfig::default();
        config.listen_port = 0;
        assert!(config.validate().is_err());

        let config =
            ServerConfig::from_lookup(lookup(&[("SUPPORTED_CURRENCIES", "EUR,GBP")])).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = ServerConfig::from_lookup(lookup(&[("CACHE_TTL_MS", "0")])).unwrap();
        assert!(config.validate().is_err());
    }
}
