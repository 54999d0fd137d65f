//! HTTP route definitions

use crate::{handlers, middleware, AppState};
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload_size = state.config.max_upload_size;

    // File endpoints, behind authentication
    let files = Router::new()
        .route(
            "/file",
            get(handlers::get_file)
                .head(handlers::head_file)
                .post(handlers::store_file),
        )
        .route("/file/{container}/{*target}", delete(handlers::delete_file))
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::auth_middleware,
        ))
        .route_layer(DefaultBodyLimit::max(max_upload_size))
        .route_layer(RequestBodyLimitLayer::new(max_upload_size));

    let router = Router::new()
        // Service endpoints
        .route("/", get(handlers::root))
        .route("/healthcheck", get(handlers::health_check))
        .merge(files)
        // Apply middleware
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware));

    let router = if state.config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(Any);
        router.layer(cors)
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
