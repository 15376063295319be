use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, ProductId, UserId};
use domain::{Cart, Order, OrderStatus, Product};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::{CartStore, OrderStore, ProductStore},
};

#[derive(Debug, Default)]
struct FailureFlags {
    on_order_insert: bool,
    on_cart_upsert: bool,
    on_stock_release: bool,
}

/// In-memory store implementation for testing and local runs.
///
/// Implements all three store traits over shared maps. Stock
/// reservations perform the check and the decrement inside one write
/// lock, so they are linearizable like the PostgreSQL conditional
/// update.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    carts: Arc<RwLock<HashMap<UserId, Cart>>>,
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    failures: Arc<RwLock<FailureFlags>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Configures the store to fail the next order inserts.
    pub async fn set_fail_on_order_insert(&self, fail: bool) {
        self.failures.write().await.on_order_insert = fail;
    }

    /// Configures the store to fail cart upserts.
    pub async fn set_fail_on_cart_upsert(&self, fail: bool) {
        self.failures.write().await.on_cart_upsert = fail;
    }

    /// Configures the store to fail stock releases.
    pub async fn set_fail_on_stock_release(&self, fail: bool) {
        self.failures.write().await.on_stock_release = fail;
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&product_id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn stock(&self, product_id: ProductId) -> Result<u32> {
        let products = self.products.read().await;
        products
            .get(&product_id)
            .map(|p| p.stock_quantity)
            .ok_or(StoreError::ProductNotFound(product_id))
    }

    async fn reserve_stock(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        // Check and decrement under a single write lock.
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&product_id)
            .ok_or(StoreError::ProductNotFound(product_id))?;

        if product.stock_quantity < quantity {
            return Err(StoreError::InsufficientStock {
                product_id,
                requested: quantity,
                available: product.stock_quantity,
            });
        }

        product.stock_quantity -= quantity;
        Ok(())
    }

    async fn release_stock(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        if self.failures.read().await.on_stock_release {
            return Err(StoreError::Unavailable(
                "stock release failure injected".to_string(),
            ));
        }

        let mut products = self.products.write().await;
        let product = products
            .get_mut(&product_id)
            .ok_or(StoreError::ProductNotFound(product_id))?;
        product.stock_quantity += quantity;
        Ok(())
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn get_cart(&self, user_id: UserId) -> Result<Option<Cart>> {
        Ok(self.carts.read().await.get(&user_id).cloned())
    }

    async fn upsert_cart(&self, cart: &Cart) -> Result<()> {
        if self.failures.read().await.on_cart_upsert {
            return Err(StoreError::Unavailable(
                "cart upsert failure injected".to_string(),
            ));
        }

        self.carts.write().await.insert(cart.user_id(), cart.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        if self.failures.read().await.on_order_insert {
            return Err(StoreError::Unavailable(
                "order insert failure injected".to_string(),
            ));
        }

        self.orders.write().await.insert(order.id(), order.clone());
        Ok(())
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&order_id).cloned())
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut own: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect();
        own.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(own)
    }

    async fn list_all_orders(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(all)
    }

    async fn update_order(&self, order: &Order, expected: OrderStatus) -> Result<bool> {
        // Compare-and-swap under the write lock, mirroring the
        // conditional UPDATE in the PostgreSQL store.
        let mut orders = self.orders.write().await;
        match orders.get(&order.id()) {
            Some(current) if current.status() == expected => {
                orders.insert(order.id(), order.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<()> {
        self.orders.write().await.remove(&order_id);
        Ok(())
    }
}
