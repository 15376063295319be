//! Shared identifier types for the commerce backend.

mod ids;

pub use ids::{CartItemId, OrderId, ProductId, UserId};
