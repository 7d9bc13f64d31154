// src/routes/mod.rs
pub mod chat;

use crate::{config::CorsOrigins, state::SharedState};
use axum::{
    Router,
    routing::{get, post},
};
use chat::{chat_handler, health_handler, root_handler};
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the configured origins. An explicit list allows credentials and
/// mirrors the preflight's method and headers; `*` cannot carry credentials.
pub fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    match origins {
        CorsOrigins::Any => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsOrigins::List(list) => CorsLayer::new()
            .allow_origin(list.clone())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
    }
}
