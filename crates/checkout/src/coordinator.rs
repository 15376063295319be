//! Reservation coordinator converting carts into orders.

use common::{ProductId, UserId};
use domain::{Order, ShippingAddress};
use store::{CartStore, OrderStore, ProductStore, StoreError};

use crate::error::{CheckoutError, Result};

/// Orchestrates the cart-to-order transition.
///
/// For every line item in the cart the coordinator performs an atomic
/// stock reservation, then persists the order snapshot and empties the
/// cart. Any failure triggers compensation (stock release, order
/// deletion) so the caller never observes partial state: stock is
/// decremented if and only if an order exists for it.
pub struct CheckoutCoordinator<S> {
    store: S,
}

impl<S: ProductStore + CartStore + OrderStore> CheckoutCoordinator<S> {
    /// Creates a new coordinator over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Places an order from the user's current cart.
    ///
    /// Returns the created order, or a typed error with no net side
    /// effects: on failure the cart is untouched and every reserved
    /// unit has been released.
    #[tracing::instrument(skip(self, shipping_address))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        shipping_address: ShippingAddress,
        payment_method: String,
    ) -> Result<Order> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let start = std::time::Instant::now();

        let result = self
            .try_place_order(user_id, shipping_address, payment_method)
            .await;

        metrics::histogram!("checkout_duration_seconds").record(start.elapsed().as_secs_f64());
        match &result {
            Ok(order) => {
                metrics::counter!("checkout_completed").increment(1);
                tracing::info!(
                    order_id = %order.id(),
                    total = %order.total_amount(),
                    items = order.items().len(),
                    "order placed"
                );
            }
            Err(err) => {
                metrics::counter!("checkout_failed").increment(1);
                tracing::warn!(%user_id, error = %err, "checkout failed");
            }
        }
        result
    }

    async fn try_place_order(
        &self,
        user_id: UserId,
        shipping_address: ShippingAddress,
        payment_method: String,
    ) -> Result<Order> {
        // 1. Load the cart; a missing or empty cart cannot be ordered.
        let cart = self
            .store
            .get_cart(user_id)
            .await?
            .filter(|c| !c.is_empty())
            .ok_or(CheckoutError::EmptyCart)?;

        // 2. Reserve every line in ascending product order. The stable
        // ordering means two checkouts with overlapping products
        // contend in the same sequence, bounding deadlock risk.
        let mut lines: Vec<(ProductId, u32)> = cart
            .items()
            .iter()
            .map(|i| (i.product_id, i.quantity))
            .collect();
        lines.sort_by_key(|(product_id, _)| *product_id);

        let mut reserved: Vec<(ProductId, u32)> = Vec::with_capacity(lines.len());
        for (product_id, quantity) in lines {
            match self.store.reserve_stock(product_id, quantity).await {
                Ok(()) => reserved.push((product_id, quantity)),
                Err(err) => {
                    // 3. Roll back everything reserved so far, then
                    // surface the originating error.
                    self.release_all(&reserved)
                        .await
                        .map_err(|rollback_err| inconsistency(&err, rollback_err))?;
                    return Err(err.into());
                }
            }
        }

        // 4. Persist the snapshot. Items are deep-copied out of the
        // cart, so the order is immune to later cart mutation.
        let order = Order::from_cart(&cart, shipping_address, payment_method);
        if let Err(err) = self.store.insert_order(&order).await {
            self.release_all(&reserved)
                .await
                .map_err(|rollback_err| inconsistency(&err, rollback_err))?;
            return Err(err.into());
        }

        // 5. Empty the cart. If this fails, undo the order and the
        // reservations: an order must not exist alongside a cart that
        // still holds its items.
        let mut emptied = cart;
        emptied.clear();
        if let Err(err) = self.store.upsert_cart(&emptied).await {
            if let Err(delete_err) = self.store.delete_order(order.id()).await {
                tracing::error!(
                    order_id = %order.id(),
                    error = %delete_err,
                    "failed to delete order while compensating cart-clear failure"
                );
                metrics::counter!("checkout_rollback_failures_total").increment(1);
                return Err(inconsistency(&err, delete_err));
            }
            self.release_all(&reserved)
                .await
                .map_err(|rollback_err| inconsistency(&err, rollback_err))?;
            return Err(err.into());
        }

        Ok(order)
    }

    /// Releases reserved stock in reverse reservation order.
    ///
    /// Every line is attempted even if an earlier release fails; the
    /// first failure is returned so the caller can escalate it.
    async fn release_all(
        &self,
        reserved: &[(ProductId, u32)],
    ) -> std::result::Result<(), StoreError> {
        let mut first_err = None;
        for (product_id, quantity) in reserved.iter().rev() {
            if let Err(err) = self.store.release_stock(*product_id, *quantity).await {
                tracing::error!(
                    %product_id,
                    quantity,
                    error = %err,
                    "failed to release reserved stock during rollback"
                );
                metrics::counter!("checkout_rollback_failures_total").increment(1);
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

fn inconsistency(cause: &dyn std::fmt::Display, compensation_err: StoreError) -> CheckoutError {
    CheckoutError::Inconsistency(format!(
        "compensation failed after {cause}: {compensation_err}"
    ))
}
