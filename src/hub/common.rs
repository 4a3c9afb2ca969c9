//! Common types for REST API responses and errors

use crate::Error;
use axum::{http::StatusCode, Json};
use serde::Serialize;

/// API error response body
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub detail: String,
}

impl ApiError {
    pub fn new(detail: impl Into<String>) -> Self {
        ApiError {
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> (StatusCode, Json<ApiError>) {
        (StatusCode::BAD_REQUEST, Json(ApiError::new(detail)))
    }

    pub fn not_found(detail: impl Into<String>) -> (StatusCode, Json<ApiError>) {
        (StatusCode::NOT_FOUND, Json(ApiError::new(detail)))
    }

    pub fn internal(detail: impl Into<String>) -> (StatusCode, Json<ApiError>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(detail)),
        )
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

/// Map a routing error onto the fixed status-code contract
pub fn from_error(err: Error) -> (StatusCode, Json<ApiError>) {
    match err {
        Error::Validation(msg) => ApiError::bad_request(msg),
        Error::BudgetExceeded => (
            StatusCode::PAYMENT_REQUIRED,
            Json(ApiError::new("Budget exceeded")),
        ),
        Error::NoProvidersAvailable => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new("All providers unavailable")),
        ),
        other => ApiError::internal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_contract() {
        let (status, body) = from_error(Error::validation("bad prompt"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.detail, "bad prompt");

        let (status, body) = from_error(Error::BudgetExceeded);
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body.detail, "Budget exceeded");

        let (status, body) = from_error(Error::NoProvidersAvailable);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.detail, "All providers unavailable");

        let (status, _) = from_error(Error::internal("boom"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
