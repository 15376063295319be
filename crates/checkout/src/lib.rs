//! Cart services and the cart-to-order reservation coordinator.
//!
//! The coordinator converts a user's cart into an immutable order:
//! 1. Reserve stock for every line item (ascending product order)
//! 2. On any failure, release everything already reserved
//! 3. Persist the order snapshot
//! 4. Empty the cart
//!
//! Steps 3 and 4 compensate (order deletion, stock release) if a later
//! step fails, so a failed checkout never leaves partial state behind.

pub mod cart;
pub mod coordinator;
pub mod error;
pub mod orders;

pub use cart::CartService;
pub use coordinator::CheckoutCoordinator;
pub use error::{CheckoutError, Result};
pub use orders::{FulfillmentUpdate, OrderService, OrderStats};
