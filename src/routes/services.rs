use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_valid::Valid;

use super::error::ApiError;
use crate::{
    models::{CreateService, Service, UpdateService},
    state::AppState,
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Service>>, ApiError> {
    Ok(Json(state.services.catalog.list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Service>, ApiError> {
    let service = state
        .services
        .catalog
        .get_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Service '{}' not found", name)))?;
    Ok(Json(service))
}

pub async fn create(
    State(state): State<AppState>,
    Valid(Json(input)): Valid<Json<CreateService>>,
) -> Result<(StatusCode, Json<Service>), ApiError> {
    let service = state.services.catalog.create(input).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Valid(Json(input)): Valid<Json<UpdateService>>,
) -> Result<Json<Service>, ApiError> {
    let service = state.services.catalog.update(&name, input).await?;
    Ok(Json(service))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.services.catalog.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}
