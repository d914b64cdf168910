//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The launcher serves the built chat client as static files and relays the
//! one API call the client makes, `POST /conversation`, to the configured
//! chat backend. Unknown paths fall back to `index.html`; the client routes
//! on the URL hash, so every page is the same document.

pub mod conversation;

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full launcher router: API routes plus the static client.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_dir = state.config.static_dir.clone();
    let client = ServeDir::new(&static_dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/conversation", post(conversation::relay))
        .route("/healthz", get(healthz))
        .fallback_service(client)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
