//! JSON web API for the restaurant voice-agent console.
//!
//! Owner routes live under `/api` and identify the caller by the
//! `x-user-id` header. Shared calling pages live under `/shared` and need
//! no identity.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the application with all routes and request tracing.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
