//! Checkout and order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::{FulfillmentUpdate, OrderStats};
use common::OrderId;
use domain::{Order, OrderStatus, ShippingAddress};
use serde::Deserialize;
use store::{CartStore, OrderStore, ProductStore};

use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// POST /orders — convert the user's cart into an order.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state
        .coordinator
        .place_order(user_id, req.shipping_address, req.payment_method)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders — the user's order history, newest first.
pub async fn list<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders.list_for_user(user_id).await?))
}

/// GET /orders/:id — one of the user's orders.
pub async fn get<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;
    Ok(Json(state.orders.get(user_id, order_id).await?))
}

/// GET /orders/admin/all — every order in the system. Admin only.
pub async fn list_all<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders.list_all().await?))
}

/// GET /orders/admin/stats — per-status counts and revenue. Admin only.
pub async fn stats<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(_): AdminUser,
) -> Result<Json<OrderStats>, ApiError> {
    Ok(Json(state.orders.stats().await?))
}

/// PATCH /orders/:id/status — move an order through its lifecycle.
/// Admin only; cancelling releases the order's stock.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orders.update_status(order_id, req.status).await?;
    tracing::info!(%order_id, status = %req.status, %admin_id, "order status changed by admin");
    Ok(Json(order))
}

/// PATCH /orders/:id — attach fulfillment metadata. Admin only.
#[tracing::instrument(skip(state, update))]
pub async fn update_fulfillment<S: ProductStore + CartStore + OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(_): AdminUser,
    Path(id): Path<String>,
    Json(update): Json<FulfillmentUpdate>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;
    Ok(Json(state.orders.update_fulfillment(order_id, update).await?))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(OrderId::from(uuid))
}
