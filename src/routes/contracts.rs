use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_valid::Valid;
use serde::Deserialize;
use uuid::Uuid;

use super::error::ApiError;
use crate::{
    auth::{AuthError, Identity},
    middleware::OrgAccess,
    models::{Contract, CreateContract, OrgUserRole},
    state::AppState,
};

/// Roles allowed to manage contracts on behalf of an organization.
const CONTRACT_ROLES: &[OrgUserRole] = &[
    OrgUserRole::Owner,
    OrgUserRole::Admin,
    OrgUserRole::Manager,
];

/// Check that the caller may act on `organization_id`: an organization key
/// must belong to it, a user must hold one of `allowed` roles in it.
async fn check_org_access(
    state: &AppState,
    identity: &Identity,
    organization_id: Uuid,
    allowed: &[OrgUserRole],
) -> Result<(), ApiError> {
    if let Some(org) = identity.as_organization() {
        if org.organization_id != organization_id {
            return Err(AuthError::NotAMember.into());
        }
        return Ok(());
    }
    let access: OrgAccess = state.org_roles.resolve(identity, organization_id).await?;
    access.require(allowed)?;
    Ok(())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Valid(Json(input)): Valid<Json<CreateContract>>,
) -> Result<(StatusCode, Json<Contract>), ApiError> {
    check_org_access(&state, &identity, input.organization_id, CONTRACT_ROLES).await?;

    let contract = state.services.contracts.create(input).await?;
    Ok((StatusCode::CREATED, Json(contract)))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub organization_id: Option<Uuid>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Contract>>, ApiError> {
    // Organization keys always see their own contracts.
    if let Some(org) = identity.as_organization() {
        if query
            .organization_id
            .is_some_and(|id| id != org.organization_id)
        {
            return Err(AuthError::NotAMember.into());
        }
        let contracts = state
            .services
            .contracts
            .list_for_organization(org.organization_id)
            .await?;
        return Ok(Json(contracts));
    }

    match query.organization_id {
        Some(id) => {
            // Membership in any role suffices to read contracts.
            state.org_roles.resolve(&identity, id).await?;
            Ok(Json(state.services.contracts.list_for_organization(id).await?))
        }
        None if identity.is_platform_admin() => {
            Ok(Json(state.services.contracts.list().await?))
        }
        None => Err(ApiError::BadRequest(
            "organization_id query parameter is required".to_string(),
        )),
    }
}

pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<Json<Contract>, ApiError> {
    let contract = state
        .services
        .contracts
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contract not found".to_string()))?;

    // Reading requires standing in the contract's organization, any role.
    if let Some(org) = identity.as_organization() {
        if org.organization_id != contract.organization_id {
            return Err(AuthError::NotAMember.into());
        }
    } else {
        state
            .org_roles
            .resolve(&identity, contract.organization_id)
            .await?;
    }

    Ok(Json(contract))
}

pub async fn terminate(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<Json<Contract>, ApiError> {
    let contract = state
        .services
        .contracts
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contract not found".to_string()))?;

    check_org_access(&state, &identity, contract.organization_id, CONTRACT_ROLES).await?;

    let contract = state.services.contracts.terminate(id).await?;
    Ok(Json(contract))
}
