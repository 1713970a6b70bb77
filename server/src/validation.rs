//! Query validation for the quote endpoints.

use fxquote_common::{Currency, SupportedCurrencies};
use fxquote_fx::{QuoteRequest, RoundingPolicy};
use serde::Deserialize;

/// Smallest accepted base amount.
pub const MIN_BASE_AMOUNT: f64 = 1.0;

/// Raw query parameters of `/quote` and `/debug`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteParams {
    pub base_currency: Option<String>,
    pub quote_currency: Option<String>,
    pub base_amount: Option<String>,
    pub rounding_policy: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuote {
    pub request: QuoteRequest,
    pub policy: RoundingPolicy,
}

/// Check `params`, collecting one message per invalid field.
pub fn validate_quote(
    params: &QuoteParams,
    supported: &SupportedCurrencies,
    default_policy: RoundingPolicy,
) -> Result<ValidatedQuote, Vec<String>> {
    let mut errors = Vec::new();

    let base = check_currency(
        "baseCurrency",
        params.base_currency.as_deref(),
        supported,
        &mut errors,
    );
    let quote = check_currency(
        "quoteCurrency",
        params.quote_currency.as_deref(),
        supported,
        &mut errors,
    );
    let amount = check_amount(params.base_amount.as_deref(), &mut errors);

    let policy = match params.rounding_policy.as_deref().map(str::trim) {
        None | Some("") => Some(default_policy),
        Some(name) => match name.parse::<RoundingPolicy>() {
            Ok(policy) => Some(policy),
            Err(e) => {
                errors.push(e.to_string());
                None
            }
        },
    };

    match (base, quote, amount, policy) {
        (Some(base), Some(quote), Some(amount), Some(policy)) if errors.is_empty() => {
            Ok(ValidatedQuote {
                request: QuoteRequest::new(base, quote, amount),
                policy,
            })
        }
        _ => Err(errors),
    }
}

fn check_currency(
    field: &str,
    value: Option<&str>,
    supported: &SupportedCurrencies,
    errors: &mut Vec<String>,
) -> Option<Currency> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        errors.push(format!("{field} is required"));
        return None;
    }

    let currency = supported.parse(value);
    if currency.is_none() {
        errors.push(format!(
            "Invalid {field} '{}', expected one of {}",
            value.to_uppercase(),
            supported.codes()
        ));
    }
    currency
}

fn check_amount(value: Option<&str>, errors: &mut Vec<String>) -> Option<f64> {
    let amount = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite());

    match amount {
        None => {
            errors.push("Base amount must be a number".to_string());
            None
        }
        Some(amount) if amount < MIN_BASE_AMOUNT => {
            errors.push("Base amount must be a positive number".to_string());
            None
        }
        Some(amount) => Some(amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(base: &str, quote: &str, amount: &str) -> QuoteParams {
        QuoteParams {
            base_currency: Some(base.to_string()),
            quote_currency: Some(quote.to_string()),
            base_amount: Some(amount.to_string()),
            rounding_policy: None,
        }
    }

    fn validate(params: &QuoteParams) -> Result<ValidatedQuote, Vec<String>> {
        validate_quote(params, &SupportedCurrencies::default(), RoundingPolicy::RoundHalfEven)
    }

    #[test]
    fn test_valid_request_is_normalised() {
        let validated = validate(&params("usd", " eur ", "10000")).unwrap();

        assert_eq!(validated.request.base, Currency::usd());
        assert_eq!(validated.request.quote, Currency::eur());
        assert_eq!(validated.request.amount, 10000.0);
        assert_eq!(validated.policy, RoundingPolicy::RoundHalfEven);
    }

    #[test]
    fn test_unsupported_currency() {
        let errors = validate(&params("USD", "INVALID", "10000")).unwrap_err();
        assert_eq!(
            errors,
            vec!["Invalid quoteCurrency 'INVALID', expected one of USD, EUR, GBP, ILS"]
        );
    }

    #[test]
    fn test_amount_bounds() {
        assert_eq!(
            validate(&params("USD", "EUR", "-1")).unwrap_err(),
            vec!["Base amount must be a positive number"]
        );
        assert!(validate(&params("USD", "EUR", "0.5")).is_err());
        assert!(validate(&params("USD", "EUR", "1")).is_ok());
        assert!(validate(&params("USD", "EUR", "1e3")).is_ok());
    }

    #[test]
    fn test_non_numeric_amount() {
        for amount in ["", "ten", "NaN", "inf"] {
            assert_eq!(
                validate(&params("USD", "EUR", amount)).unwrap_err(),
                vec!["Base amount must be a number"],
                "amount {amount:?}"
            );
        }
    }

    #[test]
    fn test_every_violation_is_listed() {
        let errors = validate(&QuoteParams::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "baseCurrency is required",
                "quoteCurrency is required",
                "Base amount must be a number",
            ]
        );
    }

    #[test]
    fn test_rounding_policy_param() {
        let mut p = params("USD", "EUR", "10");
        p.rounding_policy = Some("roundUp".to_string());
        assert_eq!(validate(&p).unwrap().policy, RoundingPolicy::RoundUp);

        p.rounding_policy = Some("sideways".to_string());
        assert_eq!(validate(&p).unwrap_err(), vec!["Unknown rounding policy: sideways"]);
    }
}
