//! Route definitions for the DocPress HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{Router, extract::DefaultBodyLimit, routing::get, routing::post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // Slack over the per-file ceiling so multipart framing overhead does
    // not trip the transport limit before the handler's own size check.
    let body_limit = (state.config.storage.max_upload_size_bytes as usize)
        .saturating_add(64 * 1024);

    let api_routes = Router::new()
        .merge(convert_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Conversion endpoints, one per job kind.
fn convert_routes() -> Router<AppState> {
    Router::new()
        .route("/convert/compress", post(handlers::convert::compress))
        .route("/convert/merge", post(handlers::convert::merge))
        .route("/convert/split", post(handlers::convert::split))
        .route(
            "/convert/image-to-pdf",
            post(handlers::convert::image_to_pdf),
        )
        .route(
            "/convert/pdf-to-image",
            post(handlers::convert::pdf_to_image),
        )
        .route("/convert/pdf-to-word", post(handlers::convert::pdf_to_word))
        .route("/convert/word-to-pdf", post(handlers::convert::word_to_pdf))
}

/// Health check endpoint.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Build CORS layer from configuration.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    use axum::http::{HeaderValue, Method};
    use tower_http::cors::Any;

    let cors_config = &state.config.server.cors;

    let mut cors = CorsLayer::new();

    if cors_config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors = cors.allow_methods(methods);

    if cors_config.allowed_headers.contains(&"*".to_string()) {
        cors = cors.allow_headers(Any);
    }

    cors
}
