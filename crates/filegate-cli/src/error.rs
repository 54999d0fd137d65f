//! API error type and its HTTP rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use filegate_core::GatewayError;
use serde::Serialize;
use thiserror::Error;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    Unauthorized(String),
}

impl ApiError {
    /// Missing or malformed request parameter
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::Gateway(GatewayError::invalid_request(message))
    }

    /// Missing or rejected credentials
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Error kind reported to clients
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Gateway(e) => e.kind(),
            Self::Unauthorized(_) => "Unauthorized",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Gateway(GatewayError::InvalidRequest(_))
            | Self::Gateway(GatewayError::InvalidTarget { .. }) => StatusCode::BAD_REQUEST,
            Self::Gateway(GatewayError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Gateway(GatewayError::Transfer { .. })
            | Self::Gateway(GatewayError::Unexpected { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
    request_id: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let kind = self.kind();
        let request_id = uuid::Uuid::new_v4().to_string();

        let body = ErrorBody {
            error: kind,
            message: self.to_string(),
            request_id: request_id.clone(),
        };

        // x-error-code carries the kind for HEAD requests, which have no body
        (
            status,
            [("x-error-code", kind), ("x-request-id", request_id.as_str())],
            Json(body),
        )
            .into_response()
    }
}
