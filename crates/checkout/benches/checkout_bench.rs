use checkout::CheckoutCoordinator;
use common::{ProductId, UserId};
use criterion::{criterion_group, criterion_main, Criterion};
use domain::{Cart, Money, Price, Product, ShippingAddress};
use store::{CartStore, InMemoryStore, ProductStore};

fn make_product(stock: u32) -> Product {
    Product {
        id: ProductId::new(),
        name: "Linen Shirt".to_string(),
        description: "Bench product".to_string(),
        price: Price::regular(Money::from_cents(2500)),
        sizes: vec!["M".to_string()],
        colors: vec!["Black".to_string()],
        images: vec![],
        stock_quantity: stock,
    }
}

fn make_address() -> ShippingAddress {
    ShippingAddress {
        street: "42 Loom Lane".to_string(),
        city: "Pokhara".to_string(),
        state: "Gandaki".to_string(),
        zip_code: "33700".to_string(),
    }
}

fn bench_place_order(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    c.bench_function("place_order_5_lines", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let store = InMemoryStore::new();
                let products: Vec<Product> = (0..5).map(|_| make_product(u32::MAX)).collect();
                let user = UserId::new();
                let mut cart = Cart::empty(user);
                for product in &products {
                    store.insert_product(product).await.unwrap();
                    cart.add_item(product, 2, "M", "Black").unwrap();
                }
                store.upsert_cart(&cart).await.unwrap();

                CheckoutCoordinator::new(store)
                    .place_order(user, make_address(), "card".to_string())
                    .await
                    .unwrap()
            })
        })
    });
}

fn bench_failed_reservation_rollback(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    c.bench_function("place_order_rollback_on_last_line", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let store = InMemoryStore::new();
                let mut products: Vec<Product> = (0..5).map(|_| make_product(u32::MAX)).collect();
                products.sort_by_key(|p| p.id);
                products[4].stock_quantity = 0;

                let user = UserId::new();
                let mut cart = Cart::empty(user);
                for product in &products {
                    store.insert_product(product).await.unwrap();
                    cart.add_item(product, 1, "M", "Black").unwrap();
                }
                store.upsert_cart(&cart).await.unwrap();

                CheckoutCoordinator::new(store)
                    .place_order(user, make_address(), "card".to_string())
                    .await
                    .unwrap_err()
            })
        })
    });
}

criterion_group!(benches, bench_place_order, bench_failed_reservation_rollback);
criterion_main!(benches);
