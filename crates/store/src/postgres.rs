use async_trait::async_trait;
use common::{OrderId, ProductId, UserId};
use domain::{Cart, Order, OrderStatus, Product};
use futures_util::TryStreamExt;
use sqlx::{
    PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};

use crate::{
    Result, StoreError,
    store::{CartStore, OrderStore, ProductStore},
};

/// PostgreSQL-backed store implementation.
///
/// Carts and orders are stored as JSONB documents. Products keep their
/// stock counter in a dedicated `stock_quantity` column so reservations
/// can be expressed as a single conditional `UPDATE`; the column, not
/// the document, is authoritative for stock.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database and returns a store over a fresh pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: &PgRow) -> Result<Product> {
        let data: serde_json::Value = row.try_get("data")?;
        let mut product: Product = serde_json::from_value(data)?;
        // The column wins over whatever the document was serialized with.
        product.stock_quantity = row.try_get::<i64, _>("stock_quantity")? as u32;
        Ok(product)
    }

    fn row_to_order(row: &PgRow) -> Result<Order> {
        let data: serde_json::Value = row.try_get("data")?;
        Ok(serde_json::from_value(data)?)
    }
}

#[async_trait]
impl ProductStore for PostgresStore {
    async fn insert_product(&self, product: &Product) -> Result<()> {
        let data = serde_json::to_value(product)?;

        sqlx::query(
            r#"
            INSERT INTO products (id, stock_quantity, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET stock_quantity = EXCLUDED.stock_quantity, data = EXCLUDED.data
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(i64::from(product.stock_quantity))
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT stock_quantity, data FROM products WHERE id = $1")
            .bind(product_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Self::row_to_product(&r)).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let mut rows =
            sqlx::query("SELECT stock_quantity, data FROM products ORDER BY data->>'name'")
                .fetch(&self.pool);

        let mut products = Vec::new();
        while let Some(row) = rows.try_next().await? {
            products.push(Self::row_to_product(&row)?);
        }
        Ok(products)
    }

    async fn stock(&self, product_id: ProductId) -> Result<u32> {
        let stock: Option<i64> =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
                .bind(product_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        stock
            .map(|s| s as u32)
            .ok_or(StoreError::ProductNotFound(product_id))
    }

    async fn reserve_stock(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        // Single conditional update: the check and the decrement are one
        // statement, so concurrent reservations for the same product
        // serialize on the row and can never drive the counter negative.
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity - $2
            WHERE id = $1 AND stock_quantity >= $2
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(i64::from(quantity))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish a missing product from insufficient stock. The
            // follow-up read may already be stale; it is only used for
            // the error message.
            let available: Option<i64> =
                sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
                    .bind(product_id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await?;

            return match available {
                None => Err(StoreError::ProductNotFound(product_id)),
                Some(available) => {
                    tracing::debug!(
                        %product_id,
                        requested = quantity,
                        available,
                        "stock reservation rejected"
                    );
                    Err(StoreError::InsufficientStock {
                        product_id,
                        requested: quantity,
                        available: available as u32,
                    })
                }
            };
        }

        Ok(())
    }

    async fn release_stock(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        let result =
            sqlx::query("UPDATE products SET stock_quantity = stock_quantity + $2 WHERE id = $1")
                .bind(product_id.as_uuid())
                .bind(i64::from(quantity))
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ProductNotFound(product_id));
        }

        Ok(())
    }
}

#[async_trait]
impl CartStore for PostgresStore {
    async fn get_cart(&self, user_id: UserId) -> Result<Option<Cart>> {
        let data: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT data FROM carts WHERE user_id = $1")
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        data.map(|d| Ok(serde_json::from_value(d)?)).transpose()
    }

    async fn upsert_cart(&self, cart: &Cart) -> Result<()> {
        let data = serde_json::to_value(cart)?;

        sqlx::query(
            r#"
            INSERT INTO carts (user_id, data)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET data = EXCLUDED.data
            "#,
        )
        .bind(cart.user_id().as_uuid())
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        let data = serde_json::to_value(order)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, status, created_at, data)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.user_id().as_uuid())
        .bind(order.status().as_str())
        .bind(order.created_at())
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT data FROM orders WHERE id = $1")
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Self::row_to_order(&r)).transpose()
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let mut rows =
            sqlx::query("SELECT data FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user_id.as_uuid())
                .fetch(&self.pool);

        let mut orders = Vec::new();
        while let Some(row) = rows.try_next().await? {
            orders.push(Self::row_to_order(&row)?);
        }
        Ok(orders)
    }

    async fn list_all_orders(&self) -> Result<Vec<Order>> {
        let mut rows =
            sqlx::query("SELECT data FROM orders ORDER BY created_at DESC").fetch(&self.pool);

        let mut orders = Vec::new();
        while let Some(row) = rows.try_next().await? {
            orders.push(Self::row_to_order(&row)?);
        }
        Ok(orders)
    }

    async fn update_order(&self, order: &Order, expected: OrderStatus) -> Result<bool> {
        let data = serde_json::to_value(order)?;

        // Conditional on the status the caller read, the same shape as
        // the stock reservation: concurrent transitions serialize on
        // the row and at most one writer per observed status succeeds.
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $3, data = $4
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(expected.as_str())
        .bind(order.status().as_str())
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<()> {
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
