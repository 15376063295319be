//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use domain::DomainError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Missing or malformed identity header.
    Unauthorized(String),
    /// Authenticated but lacking the required role.
    Forbidden(String),
    /// Error surfaced from the checkout layer.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        CheckoutError::EmptyCart => (StatusCode::BAD_REQUEST, err.to_string()),
        CheckoutError::OrderNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        CheckoutError::Domain(domain_err) => domain_error_to_response(domain_err, &err),
        CheckoutError::Store(store_err) => store_error_to_response(store_err, &err),
        CheckoutError::Inconsistency(reason) => {
            tracing::error!(error = %reason, "checkout inconsistency surfaced to client");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn domain_error_to_response(err: &DomainError, outer: &CheckoutError) -> (StatusCode, String) {
    match err {
        DomainError::InvalidStatusTransition { .. } => (StatusCode::CONFLICT, outer.to_string()),
        DomainError::ItemNotFound { .. } => (StatusCode::NOT_FOUND, outer.to_string()),
        DomainError::InvalidQuantity { .. } | DomainError::InvalidPrice { .. } => {
            (StatusCode::BAD_REQUEST, outer.to_string())
        }
    }
}

fn store_error_to_response(err: &StoreError, outer: &CheckoutError) -> (StatusCode, String) {
    match err {
        // The body names the offending product so clients can tell
        // which line of their cart failed.
        StoreError::InsufficientStock { .. } => (StatusCode::CONFLICT, outer.to_string()),
        StoreError::ProductNotFound(_) => (StatusCode::NOT_FOUND, outer.to_string()),
        StoreError::Unavailable(_)
        | StoreError::Database(_)
        | StoreError::Migration(_)
        | StoreError::Serialization(_) => {
            tracing::error!(error = %outer, "storage failure surfaced to client");
            (StatusCode::INTERNAL_SERVER_ERROR, outer.to_string())
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Checkout(CheckoutError::Store(err))
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Checkout(CheckoutError::Domain(err))
    }
}
