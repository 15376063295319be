//! HTTP API server with observability for the commerce backend.
//!
//! Provides REST endpoints for the catalog, per-user carts, and the
//! checkout/order lifecycle, with structured logging (tracing) and
//! Prometheus metrics. Identity arrives as gateway-stamped headers.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{CartStore, OrderStore, ProductStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/products", post(routes::products::create::<S>))
        .route("/products", get(routes::products::list::<S>))
        .route("/products/{id}", get(routes::products::get::<S>))
        .route("/products/{id}/stock", post(routes::products::restock::<S>))
        .route("/cart", get(routes::cart::get::<S>))
        .route("/cart", delete(routes::cart::clear::<S>))
        .route("/cart/items", post(routes::cart::add_item::<S>))
        .route("/cart/items/{id}", patch(routes::cart::update_item::<S>))
        .route("/cart/items/{id}", delete(routes::cart::remove_item::<S>))
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/admin/all", get(routes::orders::list_all::<S>))
        .route("/orders/admin/stats", get(routes::orders::stats::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}", patch(routes::orders::update_fulfillment::<S>))
        .route("/orders/{id}/status", patch(routes::orders::update_status::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
