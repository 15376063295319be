//! Product catalog types.

use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Pricing for a product.
///
/// Cart price snapshots always use the regular price; the sale price
/// is display-only catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Regular price per unit.
    pub regular: Money,

    /// Optional discounted price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale: Option<Money>,
}

impl Price {
    /// Creates a price with no sale discount.
    pub fn regular(regular: Money) -> Self {
        Self {
            regular,
            sale: None,
        }
    }
}

/// A catalog product.
///
/// `stock_quantity` is the single source of truth for availability. It is
/// mutated only through the product store's stock-adjustment operations
/// (reservation, release, admin restock), never by general updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub stock_quantity: u32,
}

impl Product {
    /// Returns true if at least `quantity` units are in stock.
    pub fn has_stock(&self, quantity: u32) -> bool {
        self.stock_quantity >= quantity
    }

    /// Returns the price captured into cart line items.
    pub fn unit_price(&self) -> Money {
        self.price.regular
    }
}
