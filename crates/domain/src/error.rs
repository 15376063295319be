//! Domain error types.

use common::CartItemId;
use thiserror::Error;

use crate::status::OrderStatus;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Quantity must be at least 1.
    #[error("Invalid quantity: {quantity} (must be at least 1)")]
    InvalidQuantity { quantity: u32 },

    /// Unit price must be strictly positive.
    #[error("Invalid price: {cents} cents (must be greater than 0)")]
    InvalidPrice { cents: i64 },

    /// Line item not present in the cart.
    #[error("Cart item not found: {item_id}")]
    ItemNotFound { item_id: CartItemId },

    /// The requested order status change is not allowed.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },
}
