use async_trait::async_trait;
use common::{OrderId, ProductId, UserId};
use domain::{Cart, Order, OrderStatus, Product};

use crate::Result;

/// Persistence for catalog products and their stock counters.
///
/// All implementations must be thread-safe (Send + Sync), and the two
/// stock-adjustment operations must be linearizable per product: a
/// single atomic read-check-write, never a read followed by a separate
/// write.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Inserts or replaces a product.
    async fn insert_product(&self, product: &Product) -> Result<()>;

    /// Retrieves a product by ID.
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>>;

    /// Lists all products.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Returns the current stock for a product.
    ///
    /// Fails with `ProductNotFound` if the product does not exist.
    async fn stock(&self, product_id: ProductId) -> Result<u32>;

    /// Atomically checks that at least `quantity` units are available and
    /// decrements the counter by that amount.
    ///
    /// Fails with `InsufficientStock` (naming the product and the
    /// available count) or `ProductNotFound`; on failure the counter is
    /// untouched. Must never produce a negative counter, even under
    /// concurrent callers for the same product.
    async fn reserve_stock(&self, product_id: ProductId, quantity: u32) -> Result<()>;

    /// Atomically increments the stock counter.
    ///
    /// Used for cancellation refunds, reservation rollback, and admin
    /// restock.
    async fn release_stock(&self, product_id: ProductId, quantity: u32) -> Result<()>;
}

/// Persistence for per-user carts.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Retrieves the cart owned by a user, if one exists.
    async fn get_cart(&self, user_id: UserId) -> Result<Option<Cart>>;

    /// Inserts or replaces a user's cart.
    async fn upsert_cart(&self, cart: &Cart) -> Result<()>;
}

/// Persistence for order snapshots.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a newly created order.
    async fn insert_order(&self, order: &Order) -> Result<()>;

    /// Retrieves an order by ID.
    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Lists a user's orders, newest first.
    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Lists every order, newest first.
    async fn list_all_orders(&self) -> Result<Vec<Order>>;

    /// Replaces a stored order, guarded by a compare-and-swap on the
    /// status the caller read.
    ///
    /// Returns `false` without writing when the stored status no longer
    /// equals `expected` (or the order is gone), so concurrent status
    /// transitions serialize: at most one writer per observed status
    /// wins. Callers must treat `false` as a lost race, never retry the
    /// same transition blindly.
    async fn update_order(&self, order: &Order, expected: OrderStatus) -> Result<bool>;

    /// Deletes an order (compensation path only).
    async fn delete_order(&self, order_id: OrderId) -> Result<()>;
}
