//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fxquote_fx::FxError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by the quote handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more request parameters were rejected.
    #[error("Invalid request: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The quote service failed.
    #[error(transparent)]
    Quote(#[from] FxError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            ApiError::Validation(messages) => json!({ "error": messages }),
            ApiError::Quote(e) => {
                match &e {
                    FxError::InvalidPolicy(_) => {
                        error!(error = %e, "Rounding policy reached the service unvalidated")
                    }
                    _ => warn!(error = %e, "Quote failed"),
                }
                json!({ "error": e.to_string() })
            }
        };

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxquote_common::Currency;

    #[test]
    fn test_all_errors_are_bad_request() {
        let errors = [
            ApiError::Validation(vec!["baseCurrency is required".to_string()]),
            ApiError::Quote(FxError::UnsupportedCurrency(Currency::new("JPY"))),
            ApiError::Quote(FxError::RateFetch("timeout".to_string())),
            ApiError::Quote(FxError::InvalidPolicy("x".to_string())),
        ];

        for error in errors {
            assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_validation_display_joins_messages() {
        let error = ApiError::Validation(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(error.to_string(), "Invalid request: a; b");
    }
}
