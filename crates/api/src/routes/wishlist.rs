//! Wishlist route handlers.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::{delete, get, post},
};
use tracing::instrument;

use norkys_core::{UserId, WishlistEntryId};

use super::bad_request;
use crate::error::AppError;
use crate::models::{AddWishlistInput, WishlistEntry};
use crate::state::AppState;

/// Create the wishlist routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(add))
        .route("/user/{user_id}", get(list))
        .route("/{entry_id}", delete(remove))
}

/// `GET /api/wishlist/user/{user_id}`
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<Vec<WishlistEntry>>, AppError> {
    let Path(user_id) = path.map_err(bad_request)?;
    Ok(Json(state.wishlist().list(user_id).await?))
}

/// `POST /api/wishlist`
#[instrument(skip(state, payload))]
pub async fn add(
    State(state): State<AppState>,
    payload: Result<Json<AddWishlistInput>, JsonRejection>,
) -> Result<(StatusCode, Json<WishlistEntry>), AppError> {
    let Json(input) = payload.map_err(bad_request)?;
    let entry = state.wishlist().add(input.user_id, input.item_id).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `DELETE /api/wishlist/{entry_id}`
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    path: Result<Path<WishlistEntryId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(entry_id) = path.map_err(bad_request)?;
    state.wishlist().delete(entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
