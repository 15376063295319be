//! Catalog endpoints: browse, create, restock.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::ProductId;
use domain::{Price, Product};
use serde::Deserialize;
use store::{CartStore, OrderStore, ProductStore, StoreError};

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub stock_quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: u32,
}

/// POST /products — add a product to the catalog. Admin only.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(admin_id): AdminUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    if !req.price.regular.is_positive() {
        return Err(domain::DomainError::InvalidPrice {
            cents: req.price.regular.cents(),
        }
        .into());
    }

    let product = Product {
        id: ProductId::new(),
        name: req.name,
        description: req.description,
        price: req.price,
        sizes: req.sizes,
        colors: req.colors,
        images: req.images,
        stock_quantity: req.stock_quantity,
    };
    state.store.insert_product(&product).await?;
    tracing::info!(product_id = %product.id, %admin_id, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /products — list the catalog.
pub async fn list<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.store.list_products().await?))
}

/// GET /products/:id — fetch one product.
pub async fn get<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product_id = parse_product_id(&id)?;
    let product = state
        .store
        .get_product(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?;
    Ok(Json(product))
}

/// POST /products/:id/stock — add units to a product's stock. Admin only.
///
/// Restocking is the same atomic increment used for cancellation
/// refunds, so it composes safely with in-flight reservations.
#[tracing::instrument(skip(state))]
pub async fn restock<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<RestockRequest>,
) -> Result<Json<Product>, ApiError> {
    let product_id = parse_product_id(&id)?;
    if req.quantity < 1 {
        return Err(domain::DomainError::InvalidQuantity {
            quantity: req.quantity,
        }
        .into());
    }

    state.store.release_stock(product_id, req.quantity).await?;
    tracing::info!(%product_id, quantity = req.quantity, %admin_id, "stock replenished");

    let product = state
        .store
        .get_product(product_id)
        .await?
        .ok_or(StoreError::ProductNotFound(product_id))?;
    Ok(Json(product))
}

fn parse_product_id(id: &str) -> Result<ProductId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(ProductId::from(uuid))
}
