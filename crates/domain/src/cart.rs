//! Cart aggregate.

use common::{CartItemId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Money;
use crate::product::Product;

/// A line item in a cart.
///
/// `unit_price` is a snapshot captured when the item was added; later
/// catalog price changes do not retroactively reprice the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub unit_price: Money,
}

impl CartItem {
    /// Returns the total price for this line (quantity * unit price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Per-user cart aggregate.
///
/// `total_amount` is derived from the items and recomputed by every
/// mutation; nothing else writes it. Line identity is the tuple
/// `(product_id, size, color)` — adding an existing tuple merges
/// quantities instead of appending a duplicate row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    user_id: UserId,
    items: Vec<CartItem>,
    total_amount: Money,
}

impl Cart {
    /// Creates an empty cart for a user.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            total_amount: Money::zero(),
        }
    }

    /// Returns the owning user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the line items.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns a line item by ID.
    pub fn item(&self, item_id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Returns the number of line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the cart has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the derived total.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Adds `quantity` units of a product in the given size and color.
    ///
    /// Merges into an existing `(product_id, size, color)` line if one
    /// exists, otherwise appends a new line with the product's current
    /// regular price as the snapshot.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        size: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<&CartItem, DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidQuantity { quantity });
        }

        let unit_price = product.unit_price();
        if !unit_price.is_positive() {
            return Err(DomainError::InvalidPrice {
                cents: unit_price.cents(),
            });
        }

        let size = size.into();
        let color = color.into();

        let index = match self
            .items
            .iter()
            .position(|i| i.product_id == product.id && i.size == size && i.color == color)
        {
            Some(index) => {
                self.items[index].quantity += quantity;
                index
            }
            None => {
                self.items.push(CartItem {
                    id: CartItemId::new(),
                    product_id: product.id,
                    quantity,
                    size,
                    color,
                    unit_price,
                });
                self.items.len() - 1
            }
        };

        self.recompute_total();
        Ok(&self.items[index])
    }

    /// Replaces the quantity of an existing line item.
    pub fn update_item_quantity(
        &mut self,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidQuantity { quantity });
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or(DomainError::ItemNotFound { item_id })?;
        item.quantity = quantity;

        self.recompute_total();
        Ok(())
    }

    /// Removes a line item.
    pub fn remove_item(&mut self, item_id: CartItemId) -> Result<(), DomainError> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or(DomainError::ItemNotFound { item_id })?;
        self.items.remove(index);

        self.recompute_total();
        Ok(())
    }

    /// Empties the cart. The cart itself persists; only its contents go.
    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute_total();
    }

    // Sole writer of total_amount.
    fn recompute_total(&mut self) {
        self.total_amount = self.items.iter().map(CartItem::total_price).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Price;

    fn product(price_cents: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(),
            name: "Denim Jacket".to_string(),
            description: "Classic fit".to_string(),
            price: Price::regular(Money::from_cents(price_cents)),
            sizes: vec!["M".to_string()],
            colors: vec!["Blue".to_string()],
            images: vec![],
            stock_quantity: stock,
        }
    }

    #[test]
    fn test_add_item_snapshots_price_and_totals() {
        let p = product(2500, 10);
        let mut cart = Cart::empty(UserId::new());

        cart.add_item(&p, 2, "M", "Blue").unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].unit_price.cents(), 2500);
        assert_eq!(cart.total_amount().cents(), 5000);
    }

    #[test]
    fn test_add_same_tuple_merges_quantity() {
        let p = product(1000, 10);
        let mut cart = Cart::empty(UserId::new());

        cart.add_item(&p, 3, "M", "Blue").unwrap();
        cart.add_item(&p, 4, "M", "Blue").unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].quantity, 7);
        assert_eq!(cart.total_amount().cents(), 7000);
    }

    #[test]
    fn test_different_size_or_color_is_a_new_line() {
        let p = product(1000, 10);
        let mut cart = Cart::empty(UserId::new());

        cart.add_item(&p, 1, "M", "Blue").unwrap();
        cart.add_item(&p, 1, "L", "Blue").unwrap();
        cart.add_item(&p, 1, "M", "Black").unwrap();

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total_amount().cents(), 3000);
    }

    #[test]
    fn test_price_snapshot_survives_catalog_change() {
        let mut p = product(2000, 10);
        let mut cart = Cart::empty(UserId::new());
        cart.add_item(&p, 1, "M", "Blue").unwrap();

        p.price.regular = Money::from_cents(9999);

        assert_eq!(cart.items()[0].unit_price.cents(), 2000);
        assert_eq!(cart.total_amount().cents(), 2000);
    }

    #[test]
    fn test_add_rejects_zero_quantity() {
        let p = product(1000, 10);
        let mut cart = Cart::empty(UserId::new());
        let err = cart.add_item(&p, 0, "M", "Blue").unwrap_err();
        assert!(matches!(err, DomainError::InvalidQuantity { quantity: 0 }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_rejects_non_positive_price() {
        let p = product(0, 10);
        let mut cart = Cart::empty(UserId::new());
        let err = cart.add_item(&p, 1, "M", "Blue").unwrap_err();
        assert!(matches!(err, DomainError::InvalidPrice { cents: 0 }));
    }

    #[test]
    fn test_update_quantity_recomputes_total() {
        let p = product(500, 10);
        let mut cart = Cart::empty(UserId::new());
        let item_id = cart.add_item(&p, 2, "M", "Blue").unwrap().id;

        cart.update_item_quantity(item_id, 5).unwrap();

        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.total_amount().cents(), 2500);
    }

    #[test]
    fn test_update_quantity_rejects_zero() {
        let p = product(500, 10);
        let mut cart = Cart::empty(UserId::new());
        let item_id = cart.add_item(&p, 2, "M", "Blue").unwrap().id;

        let err = cart.update_item_quantity(item_id, 0).unwrap_err();
        assert!(matches!(err, DomainError::InvalidQuantity { quantity: 0 }));
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_update_missing_item_fails() {
        let mut cart = Cart::empty(UserId::new());
        let err = cart.update_item_quantity(CartItemId::new(), 1).unwrap_err();
        assert!(matches!(err, DomainError::ItemNotFound { .. }));
    }

    #[test]
    fn test_remove_item_recomputes_total() {
        let p1 = product(1000, 10);
        let p2 = product(300, 10);
        let mut cart = Cart::empty(UserId::new());
        let first = cart.add_item(&p1, 1, "M", "Blue").unwrap().id;
        cart.add_item(&p2, 2, "M", "Blue").unwrap();

        cart.remove_item(first).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_amount().cents(), 600);
    }

    #[test]
    fn test_remove_missing_item_fails() {
        let mut cart = Cart::empty(UserId::new());
        let err = cart.remove_item(CartItemId::new()).unwrap_err();
        assert!(matches!(err, DomainError::ItemNotFound { .. }));
    }

    #[test]
    fn test_clear_empties_and_zeroes_total() {
        let p = product(1000, 10);
        let mut cart = Cart::empty(UserId::new());
        cart.add_item(&p, 3, "M", "Blue").unwrap();

        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.total_amount().is_zero());
    }

    #[test]
    fn test_total_matches_recomputed_sum_after_mutations() {
        let p1 = product(750, 10);
        let p2 = product(1250, 10);
        let mut cart = Cart::empty(UserId::new());

        let a = cart.add_item(&p1, 2, "M", "Blue").unwrap().id;
        cart.add_item(&p2, 1, "M", "Blue").unwrap();
        cart.update_item_quantity(a, 4).unwrap();

        let expected: Money = cart.items().iter().map(CartItem::total_price).sum();
        assert_eq!(cart.total_amount(), expected);
    }
}
