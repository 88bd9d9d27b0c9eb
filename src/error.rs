//! Error types for the proxy service
//!
//! Provides unified error handling using thiserror.

use axum::{
    extract::rejection::QueryRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::interceptor::InterceptError;
use crate::limiter::{RejectReason, Rejection};
use crate::upstream::UpstreamError;

// == API Error Enum ==
/// Unified error type for HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Admission control turned the request away
    #[error("Rejected: {0}")]
    Rejected(Rejection),

    /// Upstream call failed
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<InterceptError<UpstreamError>> for ApiError {
    fn from(err: InterceptError<UpstreamError>) -> Self {
        match err {
            InterceptError::Rejected(rejection) => ApiError::Rejected(rejection),
            InterceptError::Upstream(err) => {
                warn!(error = %err, "Upstream call failed");
                ApiError::Upstream(err.to_string())
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

fn rejection_message(reason: RejectReason) -> &'static str {
    match reason {
        RejectReason::RateLimited => "Too many requests, please try again later",
        RejectReason::ConcurrencyLimited => {
            "Too many concurrent requests, please try again later"
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Rejected(rejection) => {
                let body = Json(json!({
                    "error": rejection_message(rejection.reason),
                    "reason": rejection.reason,
                    "retryAfter": rejection.retry_after_secs,
                }));
                let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(rejection.retry_after_secs));
                return response;
            }
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
