//! Header-based identity extractors.
//!
//! JWT verification happens upstream; by the time a request reaches
//! this service the gateway has stamped `x-user-id` and `x-user-role`
//! headers on it. The extractors here turn those headers into typed
//! identities and reject requests that lack them.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;

use crate::error::ApiError;

const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";

/// An authenticated user, extracted from the `x-user-id` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

/// An authenticated admin: `x-user-id` plus `x-user-role: admin`.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub UserId);

fn user_id_from_parts(parts: &Parts) -> Result<UserId, ApiError> {
    let value = parts
        .headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {USER_ID_HEADER} header")))?;
    let raw = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized(format!("Malformed {USER_ID_HEADER} header")))?;
    let uuid = uuid::Uuid::parse_str(raw)
        .map_err(|e| ApiError::Unauthorized(format!("Invalid {USER_ID_HEADER}: {e}")))?;
    Ok(UserId::from_uuid(uuid))
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthUser(user_id_from_parts(parts)?))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = user_id_from_parts(parts)?;
        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if role != "admin" {
            return Err(ApiError::Forbidden("Admin role required".to_string()));
        }
        Ok(AdminUser(user_id))
    }
}
