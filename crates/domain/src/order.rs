//! Order snapshot and fulfillment metadata.

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::DomainError;
use crate::money::Money;
use crate::status::OrderStatus;

/// Shipping destination for an order.
///
/// This four-field shape is the canonical address everywhere in the
/// system; there is deliberately no country field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// A purchased line item, copied out of the cart at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub unit_price: Money,
}

impl OrderItem {
    /// Returns the total price for this line (quantity * unit price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// An immutable order snapshot.
///
/// Items and total are deep copies of the cart taken at creation and
/// never change afterwards; only the status and fulfillment metadata
/// (payment ID, tracking number, delivery estimate) are mutable, and
/// status changes go through [`Order::transition_to`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    items: Vec<OrderItem>,
    total_amount: Money,
    status: OrderStatus,
    shipping_address: ShippingAddress,
    payment_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    estimated_delivery_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Builds a pending order from a cart snapshot.
    ///
    /// Line items are copied by value so later cart mutations cannot
    /// reach into order history.
    pub fn from_cart(
        cart: &Cart,
        shipping_address: ShippingAddress,
        payment_method: impl Into<String>,
    ) -> Self {
        let items = cart
            .items()
            .iter()
            .map(|i| OrderItem {
                product_id: i.product_id,
                quantity: i.quantity,
                size: i.size.clone(),
                color: i.color.clone(),
                unit_price: i.unit_price,
            })
            .collect();

        Self {
            id: OrderId::new(),
            user_id: cart.user_id(),
            items,
            total_amount: cart.total_amount(),
            status: OrderStatus::Pending,
            shipping_address,
            payment_method: payment_method.into(),
            payment_id: None,
            tracking_number: None,
            estimated_delivery_date: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    pub fn payment_id(&self) -> Option<&str> {
        self.payment_id.as_deref()
    }

    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    pub fn estimated_delivery_date(&self) -> Option<DateTime<Utc>> {
        self.estimated_delivery_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Applies a status change, enforcing the state machine.
    pub fn transition_to(&mut self, status: OrderStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(status) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        Ok(())
    }

    /// Attaches a payment gateway reference.
    pub fn set_payment_id(&mut self, payment_id: impl Into<String>) {
        self.payment_id = Some(payment_id.into());
    }

    /// Attaches a carrier tracking number.
    pub fn set_tracking_number(&mut self, tracking_number: impl Into<String>) {
        self.tracking_number = Some(tracking_number.into());
    }

    /// Sets the estimated delivery date.
    pub fn set_estimated_delivery_date(&mut self, date: DateTime<Utc>) {
        self.estimated_delivery_date = Some(date);
    }
}
