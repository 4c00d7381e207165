//! Cart route handlers.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;
use tracing::instrument;

use norkys_core::{AddressId, CartId, UserId};

use super::bad_request;
use crate::error::AppError;
use crate::models::{Cart, CartCreated, CartDetail, CreateCartInput};
use crate::state::AppState;

/// Create the cart routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_by_status).post(create))
        .route("/user/{user_id}", get(list_by_owner))
        .route("/{cart_id}", get(detail).delete(delete))
        .route("/{cart_id}/status", put(update_status))
        .route("/{cart_id}/payment-method", put(update_payment_method))
        .route("/{cart_id}/address/{address_id}", put(bind_address))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

/// `GET /api/carts?status=`
#[instrument(skip(state))]
pub async fn list_by_status(
    State(state): State<AppState>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Result<Json<Vec<Cart>>, AppError> {
    let Query(query) = query.map_err(bad_request)?;
    let carts = state
        .lifecycle()
        .list_by_status(query.status.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(carts))
}

/// `GET /api/carts/user/{user_id}`
#[instrument(skip(state))]
pub async fn list_by_owner(
    State(state): State<AppState>,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<Vec<Cart>>, AppError> {
    let Path(user_id) = path.map_err(bad_request)?;
    Ok(Json(state.lifecycle().list_by_owner(user_id).await?))
}

/// `GET /api/carts/{cart_id}`
#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    path: Result<Path<CartId>, PathRejection>,
) -> Result<Json<CartDetail>, AppError> {
    let Path(cart_id) = path.map_err(bad_request)?;
    Ok(Json(state.lifecycle().detail(cart_id).await?))
}

/// `POST /api/carts`
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateCartInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CartCreated>), AppError> {
    let Json(input) = payload.map_err(bad_request)?;
    let cart_id = state.lifecycle().create(&input).await?;
    Ok((StatusCode::CREATED, Json(CartCreated { cart_id })))
}

/// `PUT /api/carts/{cart_id}/status` with a JSON string body.
#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    path: Result<Path<CartId>, PathRejection>,
    payload: Result<Json<String>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Path(cart_id) = path.map_err(bad_request)?;
    let Json(status) = payload.map_err(bad_request)?;
    state.lifecycle().transition(cart_id, &status).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/carts/{cart_id}/payment-method` with a JSON string body.
#[instrument(skip(state, payload))]
pub async fn update_payment_method(
    State(state): State<AppState>,
    path: Result<Path<CartId>, PathRejection>,
    payload: Result<Json<String>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Path(cart_id) = path.map_err(bad_request)?;
    let Json(method) = payload.map_err(bad_request)?;
    state
        .lifecycle()
        .set_payment_method(cart_id, &method)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/carts/{cart_id}/address/{address_id}`
#[instrument(skip(state))]
pub async fn bind_address(
    State(state): State<AppState>,
    path: Result<Path<(CartId, AddressId)>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path((cart_id, address_id)) = path.map_err(bad_request)?;
    state.lifecycle().bind_address(cart_id, address_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/carts/{cart_id}`
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<CartId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(cart_id) = path.map_err(bad_request)?;
    state.lifecycle().delete(cart_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
