use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_valid::Valid;
use uuid::Uuid;

use super::error::ApiError;
use crate::{
    auth::{AuthError, Identity},
    models::{
        AddOrgMember, CreateOrgApiKey, CreateOrganization, CreatedOrgApiKey, OrgApiKey,
        OrgUserRole, Organization, UpdateOrgMember, UpdateOrganization,
    },
    state::AppState,
};

fn username_of(identity: &Identity) -> Result<String, ApiError> {
    identity
        .as_user()
        .map(|u| u.username.clone())
        .ok_or_else(|| ApiError::Internal("User route reached without user identity".to_string()))
}

/// Any user may found an organization; they become its owner.
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Valid(Json(input)): Valid<Json<CreateOrganization>>,
) -> Result<(StatusCode, Json<Organization>), ApiError> {
    let owner = username_of(&identity)?;
    let org = state.services.organizations.create(input, owner).await?;
    Ok((StatusCode::CREATED, Json(org)))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Organization>>, ApiError> {
    Ok(Json(state.services.organizations.list().await?))
}

/// Members (any role), platform admins, and the organization's own keys may
/// read the organization.
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<Json<Organization>, ApiError> {
    if let Some(org) = identity.as_organization() {
        if org.organization_id != id {
            return Err(AuthError::NotAMember.into());
        }
    } else {
        state.org_roles.resolve(&identity, id).await?;
    }

    let org = state
        .services
        .organizations
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Organization not found".to_string()))?;
    Ok(Json(org))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Valid(Json(input)): Valid<Json<UpdateOrganization>>,
) -> Result<Json<Organization>, ApiError> {
    let access = state.org_roles.resolve(&identity, id).await?;
    access.require(&[OrgUserRole::Owner, OrgUserRole::Admin])?;

    let org = state.services.organizations.update(id, input).await?;
    Ok(Json(org))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let access = state.org_roles.resolve(&identity, id).await?;
    access.require(&[OrgUserRole::Owner])?;

    state.services.organizations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_member(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Valid(Json(input)): Valid<Json<AddOrgMember>>,
) -> Result<(StatusCode, Json<Organization>), ApiError> {
    let access = state.org_roles.resolve(&identity, id).await?;
    access.require(&[OrgUserRole::Owner, OrgUserRole::Admin])?;

    let org = state
        .services
        .organizations
        .add_member(id, input.username, input.role)
        .await?;
    Ok((StatusCode::CREATED, Json(org)))
}

pub async fn update_member(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((id, username)): Path<(Uuid, String)>,
    Json(input): Json<UpdateOrgMember>,
) -> Result<Json<Organization>, ApiError> {
    let access = state.org_roles.resolve(&identity, id).await?;
    access.require(&[OrgUserRole::Owner, OrgUserRole::Admin])?;

    let org = state
        .services
        .organizations
        .update_member(id, &username, input.role)
        .await?;
    Ok(Json(org))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((id, username)): Path<(Uuid, String)>,
) -> Result<Json<Organization>, ApiError> {
    let access = state.org_roles.resolve(&identity, id).await?;
    access.require(&[OrgUserRole::Owner, OrgUserRole::Admin])?;

    let org = state
        .services
        .organizations
        .remove_member(id, &username)
        .await?;
    Ok(Json(org))
}

pub async fn list_keys(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<OrgApiKey>>, ApiError> {
    let access = state.org_roles.resolve(&identity, id).await?;
    access.require(&[OrgUserRole::Owner, OrgUserRole::Admin])?;

    Ok(Json(state.services.organizations.list_keys(id).await?))
}

pub async fn create_key(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Valid(Json(input)): Valid<Json<CreateOrgApiKey>>,
) -> Result<(StatusCode, Json<CreatedOrgApiKey>), ApiError> {
    let access = state.org_roles.resolve(&identity, id).await?;
    access.require(&[OrgUserRole::Owner, OrgUserRole::Admin])?;

    let created = state.services.organizations.create_key(id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn revoke_key(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((id, key_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<OrgApiKey>, ApiError> {
    let access = state.org_roles.resolve(&identity, id).await?;
    access.require(&[OrgUserRole::Owner, OrgUserRole::Admin])?;

    let key = state.services.organizations.revoke_key(id, key_id).await?;
    Ok(Json(key))
}
