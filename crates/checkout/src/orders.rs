//! Order lifecycle management after checkout.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use domain::{DomainError, Money, Order, OrderStatus};
use serde::{Deserialize, Serialize};
use store::{OrderStore, ProductStore};

use crate::error::{CheckoutError, Result};

/// Fulfillment fields an admin may attach to an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FulfillmentUpdate {
    pub payment_id: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
}

/// Aggregate counts and revenue across all orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total_orders: u64,
    pub pending: u64,
    pub processing: u64,
    pub shipped: u64,
    pub delivered: u64,
    pub cancelled: u64,
    /// Revenue over non-cancelled orders.
    pub total_revenue: Money,
}

/// Reads and mutates orders once they exist.
///
/// Status changes go through the order's own transition rules;
/// cancelling an order additionally returns its reserved stock.
pub struct OrderService<S> {
    store: S,
}

impl<S: OrderStore + ProductStore> OrderService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetches an order, scoped to its owner.
    pub async fn get(&self, user_id: UserId, order_id: OrderId) -> Result<Order> {
        let order = self.get_any(order_id).await?;
        if order.user_id() != user_id {
            // Scoping failures read as not-found so order ids leak
            // nothing across users.
            return Err(CheckoutError::OrderNotFound(order_id));
        }
        Ok(order)
    }

    /// Fetches an order without ownership scoping. Admin use.
    pub async fn get_any(&self, order_id: OrderId) -> Result<Order> {
        self.store
            .get_order(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))
    }

    /// Lists a user's orders, newest first.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        Ok(self.store.list_orders_for_user(user_id).await?)
    }

    /// Lists every order, newest first. Admin use.
    pub async fn list_all(&self) -> Result<Vec<Order>> {
        Ok(self.store.list_all_orders().await?)
    }

    /// Moves an order to a new status.
    ///
    /// The transition is validated, then persisted with a
    /// compare-and-swap on the status that was read, so two concurrent
    /// transitions from the same state resolve to exactly one winner.
    /// Only the winning cancel releases stock; a release failure is
    /// surfaced as an inconsistency because the order is already
    /// cancelled at that point.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order> {
        let mut order = self.get_any(order_id).await?;
        let from = order.status();
        order.transition_to(status)?;

        if !self.store.update_order(&order, from).await? {
            // Lost the race: someone moved the order after our read.
            // Report the transition against the status that actually
            // holds now.
            let current = self.get_any(order_id).await?;
            return Err(DomainError::InvalidStatusTransition {
                from: current.status(),
                to: status,
            }
            .into());
        }
        tracing::info!(%order_id, %from, to = %status, "order status updated");
        metrics::counter!("order_status_transitions_total", "to" => status.as_str()).increment(1);

        if status == OrderStatus::Cancelled {
            self.release_order_stock(&order).await?;
        }
        Ok(order)
    }

    /// Cancels the caller's own order, releasing its stock.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, user_id: UserId, order_id: OrderId) -> Result<Order> {
        // Ownership check first; the transition rules then decide
        // whether this order can still be cancelled.
        self.get(user_id, order_id).await?;
        self.update_status(order_id, OrderStatus::Cancelled).await
    }

    /// Attaches fulfillment details to an order. Admin use.
    ///
    /// The write is guarded by the status that was read; when a status
    /// transition slips in between, the update is re-applied on top of
    /// the fresh document instead of clobbering the new status.
    pub async fn update_fulfillment(
        &self,
        order_id: OrderId,
        update: FulfillmentUpdate,
    ) -> Result<Order> {
        const MAX_ATTEMPTS: u32 = 3;

        for _ in 0..MAX_ATTEMPTS {
            let mut order = self.get_any(order_id).await?;
            if let Some(payment_id) = &update.payment_id {
                order.set_payment_id(payment_id.clone());
            }
            if let Some(tracking_number) = &update.tracking_number {
                order.set_tracking_number(tracking_number.clone());
            }
            if let Some(date) = update.estimated_delivery_date {
                order.set_estimated_delivery_date(date);
            }
            // Metadata setters never touch the status, so the current
            // status doubles as the expectation.
            if self.store.update_order(&order, order.status()).await? {
                return Ok(order);
            }
        }

        Err(CheckoutError::Inconsistency(format!(
            "order {order_id} fulfillment update lost {MAX_ATTEMPTS} consecutive races"
        )))
    }

    /// Computes aggregate order statistics. Admin use.
    pub async fn stats(&self) -> Result<OrderStats> {
        let orders = self.store.list_all_orders().await?;
        let mut stats = OrderStats {
            total_orders: orders.len() as u64,
            ..OrderStats::default()
        };
        for order in &orders {
            match order.status() {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Processing => stats.processing += 1,
                OrderStatus::Shipped => stats.shipped += 1,
                OrderStatus::Delivered => stats.delivered += 1,
                OrderStatus::Cancelled => stats.cancelled += 1,
            }
            if order.status() != OrderStatus::Cancelled {
                stats.total_revenue += order.total_amount();
            }
        }
        Ok(stats)
    }

    async fn release_order_stock(&self, order: &Order) -> Result<()> {
        for item in order.items() {
            if let Err(err) = self.store.release_stock(item.product_id, item.quantity).await {
                tracing::error!(
                    order_id = %order.id(),
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    error = %err,
                    "failed to release stock for cancelled order"
                );
                metrics::counter!("checkout_rollback_failures_total").increment(1);
                return Err(CheckoutError::Inconsistency(format!(
                    "order {} cancelled but stock release failed: {err}",
                    order.id()
                )));
            }
        }
        Ok(())
    }
}
