//! Route handlers for the quote API.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use fxquote_fx::Quote;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{validate_quote, QuoteParams};

/// Build the API router. State is supplied by the caller with `.with_state(...)`.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .route("/echo", post(echo))
        .route("/quote", get(get_quote))
        .route("/debug", get(get_debug_quote))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// GET /
pub async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to my API world!" }))
}

/// POST /echo - return the request body
pub async fn echo(body: Bytes) -> Json<Value> {
    info!(bytes = body.len(), "Echo request received");

    let echoed = if body.iter().all(u8::is_ascii_whitespace) {
        json!({})
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };

    Json(json!({
        "message": "Echoing back the request body",
        "body": echoed,
    }))
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.quote_service.metrics().to_prometheus(),
    )
}

/// GET /quote
pub async fn get_quote(
    State(state): State<AppState>,
    params: Result<Query<QuoteParams>, QueryRejection>,
) -> Result<Json<Quote>, ApiError> {
    quote(&state, params, false).await
}

/// GET /debug - quote with debug and cache diagnostics
pub async fn get_debug_quote(
    State(state): State<AppState>,
    params: Result<Query<QuoteParams>, QueryRejection>,
) -> Result<Json<Quote>, ApiError> {
    quote(&state, params, true).await
}

async fn quote(
    state: &AppState,
    params: Result<Query<QuoteParams>, QueryRejection>,
    debug: bool,
) -> Result<Json<Quote>, ApiError> {
    let service = &state.quote_service;

    // Malformed query strings get the same error shape as field violations.
    let Query(params) = params.map_err(|rejection| {
        service.metrics().validation_rejected();
        debug!(error = %rejection.body_text(), "Query string rejected");
        ApiError::Validation(vec![rejection.body_text()])
    })?;

    let supported = service.supported_currencies();
    let validated = validate_quote(&params, supported, service.default_policy()).map_err(|errors| {
        service.metrics().validation_rejected();
        debug!(?errors, "Quote request rejected");
        ApiError::Validation(errors)
    })?;

    let quote = service
        .get_quote(&validated.request, debug, validated.policy)
        .await?;

    Ok(Json(quote))
}
