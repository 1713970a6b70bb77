//! Shared handler state.

use std::sync::Arc;

use fxquote_fx::QuoteService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub quote_service: Arc<QuoteService>,
}

impl AppState {
    pub fn new(quote_service: Arc<QuoteService>) -> Self {
        Self { quote_service }
    }
}
