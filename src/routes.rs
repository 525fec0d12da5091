//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod auth;
mod logs;
mod posts;
mod stocks;
mod users;

use crate::auth::auth_middleware;
use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, Method},
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware_stack = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    // Routes that require a valid bearer token
    let protected = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/change-password", post(auth::change_password))
        .route_layer(middleware::from_fn(auth_middleware));

    // Build the router
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .merge(protected)
        // User management
        .route("/api/v1/users/create", post(users::create_user))
        .route("/api/v1/users/list", get(users::list_users))
        .route("/api/v1/users/retrieve/{id}", get(users::retrieve_user))
        .route("/api/v1/users/update/{id}", put(users::update_user))
        .route("/api/v1/users/delete/{id}", delete(users::delete_user))
        .route("/api/v1/users/login", post(users::login))
        // Blog posts
        .route("/api/v1/blog/posts/create", post(posts::create_post))
        .route("/api/v1/blog/posts/list", get(posts::list_posts))
        .route("/api/v1/blog/posts/retrieve/{id}", get(posts::retrieve_post))
        .route("/api/v1/blog/posts/update/{id}", patch(posts::update_post))
        .route("/api/v1/blog/posts/delete/{id}", delete(posts::delete_post))
        // Stocks
        .route("/api/v1/stocks/create", post(stocks::create_stock))
        .route("/api/v1/stocks/list", get(stocks::list_stocks))
        .route("/api/v1/stocks/retrieve/{id}", get(stocks::retrieve_stock))
        .route("/api/v1/stocks/update/{id}", patch(stocks::update_stock))
        // Request logs
        .route("/api/v1/logs/api-logs", get(logs::list_api_logs))
        .route("/api/v1/logs/error-logs", get(logs::list_error_logs))
        // Apply middleware and state
        .layer(middleware_stack)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .max_age(Duration::from_secs(3600))
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .max_age(Duration::from_secs(3600))
    }
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
