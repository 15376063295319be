//! Domain model for the commerce backend.
//!
//! This crate provides the pure domain types and logic:
//! - `Money` for integer-cent amounts
//! - `Product` with its mutable stock counter
//! - `Cart` aggregate with merge semantics and a derived total
//! - `Order` snapshot with its status state machine
//!
//! No I/O happens here; persistence lives in the `store` crate.

pub mod cart;
pub mod error;
pub mod money;
pub mod order;
pub mod product;
pub mod status;

pub use cart::{Cart, CartItem};
pub use error::DomainError;
pub use money::Money;
pub use order::{Order, OrderItem, ShippingAddress};
pub use product::{Price, Product};
pub use status::OrderStatus;
