use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use super::error::ApiError;
use crate::{auth::Identity, services::FeatureEvaluation, state::AppState};

#[derive(Debug, Deserialize)]
pub struct EvaluateQuery {
    pub organization_id: Option<Uuid>,
}

/// Evaluate a service's features for an organization.
///
/// Organization keys evaluate for their own organization; user callers name
/// one via `?organization_id=` and must be members (any role).
pub async fn evaluate(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(service): Path<String>,
    Query(query): Query<EvaluateQuery>,
) -> Result<Json<FeatureEvaluation>, ApiError> {
    let organization_id = match &identity {
        Identity::Organization(org) => {
            if query
                .organization_id
                .is_some_and(|id| id != org.organization_id)
            {
                return Err(ApiError::BadRequest(
                    "organization_id does not match the presented API key".to_string(),
                ));
            }
            org.organization_id
        }
        _ => {
            let id = query.organization_id.ok_or_else(|| {
                ApiError::BadRequest("organization_id query parameter is required".to_string())
            })?;
            state.org_roles.resolve(&identity, id).await?;
            id
        }
    };

    let evaluation = state
        .services
        .evaluation
        .evaluate(organization_id, &service)
        .await
        .map_err(|e| match e {
            crate::db::DbError::NotFound => ApiError::NotFound(format!(
                "No active contract for service '{}'",
                service
            )),
            other => other.into(),
        })?;
    Ok(Json(evaluation))
}
