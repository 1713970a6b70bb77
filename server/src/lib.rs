//! FxQuote Server
//!
//! HTTP front end for the quote service: parameter validation, routing and
//! error mapping around a single shared [`fxquote_fx::QuoteService`].

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod validation;

pub use config::ServerConfig;
pub use routes::create_router;
pub use state::AppState;
