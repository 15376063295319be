//! Route handlers and shared application state.

pub mod cart;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use checkout::{CartService, CheckoutCoordinator, OrderService};
use store::{CartStore, OrderStore, ProductStore};

/// Shared application state accessible from all handlers.
///
/// Every service borrows the same cloned store handle, so the cart a
/// handler writes is the cart the coordinator later reads.
pub struct AppState<S> {
    pub store: S,
    pub carts: CartService<S>,
    pub coordinator: CheckoutCoordinator<S>,
    pub orders: OrderService<S>,
}

impl<S: ProductStore + CartStore + OrderStore + Clone> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            carts: CartService::new(store.clone()),
            coordinator: CheckoutCoordinator::new(store.clone()),
            orders: OrderService::new(store.clone()),
            store,
        }
    }
}
