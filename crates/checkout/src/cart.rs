//! Cart service providing the per-user cart API.

use common::{CartItemId, ProductId, UserId};
use domain::{Cart, DomainError};
use store::{CartStore, ProductStore, StoreError};

use crate::error::Result;

/// Service for reading and mutating a user's cart.
///
/// Stock checks here are display-only: they keep obviously unfillable
/// items out of carts but reserve nothing. Reservation happens in the
/// coordinator when the order is placed.
pub struct CartService<S> {
    store: S,
}

impl<S: ProductStore + CartStore> CartService<S> {
    /// Creates a new cart service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the user's cart, creating and persisting an empty one on
    /// first access. Never returns "no cart".
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart> {
        if let Some(cart) = self.store.get_cart(user_id).await? {
            return Ok(cart);
        }

        let cart = Cart::empty(user_id);
        self.store.upsert_cart(&cart).await?;
        Ok(cart)
    }

    /// Adds `quantity` units of a product to the cart.
    ///
    /// Merges into an existing `(product, size, color)` line; the unit
    /// price is snapshotted from the current catalog price.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        size: impl Into<String> + std::fmt::Debug,
        color: impl Into<String> + std::fmt::Debug,
    ) -> Result<Cart> {
        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or(StoreError::ProductNotFound(product_id))?;

        if !product.has_stock(quantity) {
            return Err(StoreError::InsufficientStock {
                product_id,
                requested: quantity,
                available: product.stock_quantity,
            }
            .into());
        }

        let mut cart = self.get_or_create(user_id).await?;
        cart.add_item(&product, quantity, size, color)?;
        self.store.upsert_cart(&cart).await?;
        Ok(cart)
    }

    /// Replaces a line item's quantity, re-validating current stock.
    #[tracing::instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<Cart> {
        if quantity < 1 {
            return Err(DomainError::InvalidQuantity { quantity }.into());
        }

        let mut cart = self
            .store
            .get_cart(user_id)
            .await?
            .ok_or(DomainError::ItemNotFound { item_id })?;

        let product_id = cart
            .item(item_id)
            .ok_or(DomainError::ItemNotFound { item_id })?
            .product_id;
        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or(StoreError::ProductNotFound(product_id))?;

        if !product.has_stock(quantity) {
            return Err(StoreError::InsufficientStock {
                product_id,
                requested: quantity,
                available: product.stock_quantity,
            }
            .into());
        }

        cart.update_item_quantity(item_id, quantity)?;
        self.store.upsert_cart(&cart).await?;
        Ok(cart)
    }

    /// Removes a line item from the cart.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, user_id: UserId, item_id: CartItemId) -> Result<Cart> {
        let mut cart = self
            .store
            .get_cart(user_id)
            .await?
            .ok_or(DomainError::ItemNotFound { item_id })?;

        cart.remove_item(item_id)?;
        self.store.upsert_cart(&cart).await?;
        Ok(cart)
    }

    /// Empties the cart. The cart document itself persists.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<Cart> {
        let mut cart = self.get_or_create(user_id).await?;
        cart.clear();
        self.store.upsert_cart(&cart).await?;
        Ok(cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckoutError;
    use domain::{Money, Price, Product};
    use store::InMemoryStore;

    fn make_product(stock: u32, price_cents: i64) -> Product {
        Product {
            id: ProductId::new(),
            name: "Rain Jacket".to_string(),
            description: "Waterproof shell".to_string(),
            price: Price::regular(Money::from_cents(price_cents)),
            sizes: vec!["M".to_string(), "L".to_string()],
            colors: vec!["Yellow".to_string()],
            images: vec![],
            stock_quantity: stock,
        }
    }

    async fn setup(products: &[Product]) -> (CartService<InMemoryStore>, InMemoryStore) {
        let store = InMemoryStore::new();
        for product in products {
            store.insert_product(product).await.unwrap();
        }
        (CartService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_get_or_create_persists_empty_cart() {
        let (service, store) = setup(&[]).await;
        let user = UserId::new();

        let cart = service.get_or_create(user).await.unwrap();
        assert!(cart.is_empty());

        // The lazily created cart is durable.
        assert!(store.get_cart(user).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_add_item_persists_and_totals() {
        let product = make_product(10, 2500);
        let (service, store) = setup(&[product.clone()]).await;
        let user = UserId::new();

        let cart = service
            .add_item(user, product.id, 2, "M", "Yellow")
            .await
            .unwrap();

        assert_eq!(cart.total_amount().cents(), 5000);
        let persisted = store.get_cart(user).await.unwrap().unwrap();
        assert_eq!(persisted, cart);
    }

    #[tokio::test]
    async fn test_add_item_missing_product() {
        let (service, _) = setup(&[]).await;
        let err = service
            .add_item(UserId::new(), ProductId::new(), 1, "M", "Yellow")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Store(StoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_add_item_checks_stock_without_reserving() {
        let product = make_product(3, 1000);
        let (service, store) = setup(&[product.clone()]).await;
        let user = UserId::new();

        let err = service
            .add_item(user, product.id, 4, "M", "Yellow")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Store(StoreError::InsufficientStock {
                requested: 4,
                available: 3,
                ..
            })
        ));

        // A successful add leaves stock untouched: nothing is reserved.
        service
            .add_item(user, product.id, 3, "M", "Yellow")
            .await
            .unwrap();
        assert_eq!(store.stock(product.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_merged_lines_may_exceed_stock() {
        // Per-add checks pass individually; the merged quantity is only
        // rejected at order time.
        let product = make_product(5, 1000);
        let (service, _) = setup(&[product.clone()]).await;
        let user = UserId::new();

        service
            .add_item(user, product.id, 3, "M", "Yellow")
            .await
            .unwrap();
        let cart = service
            .add_item(user, product.id, 4, "M", "Yellow")
            .await
            .unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].quantity, 7);
    }

    #[tokio::test]
    async fn test_update_quantity_revalidates_stock() {
        let product = make_product(5, 1000);
        let (service, _) = setup(&[product.clone()]).await;
        let user = UserId::new();

        let cart = service
            .add_item(user, product.id, 2, "M", "Yellow")
            .await
            .unwrap();
        let item_id = cart.items()[0].id;

        let err = service
            .update_item_quantity(user, item_id, 6)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Store(StoreError::InsufficientStock { .. })
        ));

        let cart = service.update_item_quantity(user, item_id, 5).await.unwrap();
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_update_quantity_rejects_zero() {
        let (service, _) = setup(&[]).await;
        let err = service
            .update_item_quantity(UserId::new(), CartItemId::new(), 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Domain(DomainError::InvalidQuantity { quantity: 0 })
        ));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let product = make_product(10, 1000);
        let (service, store) = setup(&[product.clone()]).await;
        let user = UserId::new();

        let cart = service
            .add_item(user, product.id, 1, "M", "Yellow")
            .await
            .unwrap();
        let item_id = cart.items()[0].id;

        let cart = service.remove_item(user, item_id).await.unwrap();
        assert!(cart.is_empty());

        service
            .add_item(user, product.id, 2, "L", "Yellow")
            .await
            .unwrap();
        let cart = service.clear(user).await.unwrap();
        assert!(cart.is_empty());
        assert!(cart.total_amount().is_zero());
        assert!(store.get_cart(user).await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_item() {
        let (service, _) = setup(&[]).await;
        let err = service
            .remove_item(UserId::new(), CartItemId::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Domain(DomainError::ItemNotFound { .. })
        ));
    }
}
