pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::handlers::stream;
use crate::routes::{chats, course_plans, documents, health, models, profile};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Chat
        .route("/chat", post(stream::send_chat_stream).delete(chats::delete_chat))
        .route("/chat/visibility", patch(chats::update_visibility))
        .route("/history", get(chats::list_history))
        // Learner data
        .route(
            "/course-plans",
            get(course_plans::list_course_plans).put(course_plans::update_topic),
        )
        .route("/profile", get(profile::get_profile))
        // Artifacts
        .route("/document", get(documents::get_document))
        .route("/suggestions", get(documents::get_suggestions))
        .route("/models", get(models::list_models));

    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", openapi::ApiDoc::openapi()))
        .layer(axum_middleware::from_fn(middleware::logging::log_request))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::permissive();
    }

    let mut cors = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any);

    if config.cors.origins.iter().any(|o| o == "*") {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<axum::http::HeaderValue> = config
            .cors
            .origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    cors
}
