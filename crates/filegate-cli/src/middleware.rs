//! HTTP middleware for authentication, request ids and logging

use crate::auth::{extract_bearer_token, validate_token};
use crate::{ApiError, AppState};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // Skip auth if disabled
    if !state.config.auth_enabled {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let token = extract_bearer_token(auth_header)
        .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header format"))?;

    let secret = state.config.jwt_secret.as_deref().ok_or_else(|| {
        tracing::error!("Authentication is enabled but no JWT secret is configured");
        ApiError::unauthorized("Authentication is not available")
    })?;

    let claims = validate_token(token, secret)?;
    tracing::debug!(
        user_id = ?claims.user_id,
        role = ?claims.role,
        source = ?claims.source,
        email = ?claims.email,
        "Authenticated request"
    );

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Request ID middleware - adds x-request-id header
///
/// Error responses stamp their own id; it is left in place so the header
/// matches the `requestId` in the body.
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    if !response.headers().contains_key(REQUEST_ID_HEADER) {
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
    }
    response
}

/// Request ID extension
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}
