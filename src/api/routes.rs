use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppContext;

/// Creates the application router with all routes
pub fn create_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)),
        )
        .with_state(ctx)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/controls", get(handlers::get_controls))
        // Selector contents
        .route("/users", get(handlers::get_users))
        .route("/titles", get(handlers::get_titles))
        // Gallery views
        .route("/users/:user_id/history", get(handlers::get_history))
        .route("/recommendations", post(handlers::recommend))
        .route("/covers", get(handlers::get_cover))
}
