//! Cart endpoints. All of them are scoped to the authenticated user.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{CartItemId, ProductId};
use domain::Cart;
use serde::Deserialize;
use store::{CartStore, OrderStore, ProductStore};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub size: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// GET /cart — the user's cart, created empty on first access.
pub async fn get<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Cart>, ApiError> {
    Ok(Json(state.carts.get_or_create(user_id).await?))
}

/// POST /cart/items — add a product variant to the cart.
#[tracing::instrument(skip(state, req))]
pub async fn add_item<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<Cart>, ApiError> {
    let cart = state
        .carts
        .add_item(user_id, req.product_id, req.quantity, req.size, req.color)
        .await?;
    Ok(Json(cart))
}

/// PATCH /cart/items/:id — change a line item's quantity.
#[tracing::instrument(skip(state, req))]
pub async fn update_item<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<Cart>, ApiError> {
    let item_id = parse_item_id(&id)?;
    let cart = state
        .carts
        .update_item_quantity(user_id, item_id, req.quantity)
        .await?;
    Ok(Json(cart))
}

/// DELETE /cart/items/:id — remove a line item.
#[tracing::instrument(skip(state))]
pub async fn remove_item<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Cart>, ApiError> {
    let item_id = parse_item_id(&id)?;
    Ok(Json(state.carts.remove_item(user_id, item_id).await?))
}

/// DELETE /cart — empty the cart.
#[tracing::instrument(skip(state))]
pub async fn clear<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Cart>, ApiError> {
    Ok(Json(state.carts.clear(user_id).await?))
}

fn parse_item_id(id: &str) -> Result<CartItemId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(CartItemId::from(uuid))
}
