use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_valid::Valid;

use super::error::ApiError;
use crate::{
    auth::Identity,
    models::{CreateUser, CreatedUser, UpdateUser, User},
    state::AppState,
};

/// The authenticated user's own record.
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<User>, ApiError> {
    // The permission table only lets user keys through here.
    let user = identity
        .as_user()
        .ok_or_else(|| ApiError::Internal("User route reached without user identity".to_string()))?;
    let record = state
        .services
        .users
        .get_by_username(&user.username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", user.username)))?;
    Ok(Json(record))
}

pub async fn create(
    State(state): State<AppState>,
    Valid(Json(input)): Valid<Json<CreateUser>>,
) -> Result<(StatusCode, Json<CreatedUser>), ApiError> {
    let created = state.services.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.services.users.list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .services
        .users
        .get_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", username)))?;
    Ok(Json(user))
}

pub async fn update(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Valid(Json(input)): Valid<Json<UpdateUser>>,
) -> Result<Json<User>, ApiError> {
    let user = state.services.users.update(&username, input).await?;
    Ok(Json(user))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.services.users.delete(&username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Issue a replacement API key. The previous key stops working immediately.
pub async fn rotate_key(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<CreatedUser>, ApiError> {
    let rotated = state.services.users.rotate_key(&username).await?;
    Ok(Json(rotated))
}
