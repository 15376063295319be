//! Checkout error types.

use common::OrderId;
use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during cart and checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The user's cart is missing or has no items.
    #[error("Cart is empty")]
    EmptyCart,

    /// Order not found (or not owned by the requesting user).
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Store error (missing product, insufficient stock, database).
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Domain error (invalid quantity, bad status transition).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// A compensation step failed and the system may hold partial
    /// state. This is a defect signal, never a normal outcome; it is
    /// logged at error level and counted before being surfaced.
    #[error("Checkout inconsistency: {0}")]
    Inconsistency(String),
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
