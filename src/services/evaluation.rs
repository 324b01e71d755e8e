use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::db::{Database, DbError, DbResult};

#[derive(Debug, Clone, Serialize)]
pub struct EvaluatedFeature {
    pub key: String,
    pub enabled: bool,
}

/// The feature set a contract entitles an organization to, for one service.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureEvaluation {
    pub service: String,
    pub organization_id: Uuid,
    pub plan: String,
    pub features: Vec<EvaluatedFeature>,
}

#[derive(Clone)]
pub struct EvaluationService {
    db: Arc<Database>,
}

impl EvaluationService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Evaluate a service's features against the organization's active
    /// contract. `NotFound` covers both an unknown service and the absence
    /// of an active contract.
    pub async fn evaluate(
        &self,
        organization_id: Uuid,
        service_name: &str,
    ) -> DbResult<FeatureEvaluation> {
        let service = self
            .db
            .services()
            .get_by_name(service_name)
            .await?
            .ok_or(DbError::NotFound)?;
        let contract = self
            .db
            .contracts()
            .active_for(organization_id, service.id)
            .await?
            .ok_or(DbError::NotFound)?;

        let features = service
            .features
            .iter()
            .map(|f| EvaluatedFeature {
                key: f.key.clone(),
                enabled: f.enabled_for(&contract.plan),
            })
            .collect();

        Ok(FeatureEvaluation {
            service: service.name,
            organization_id,
            plan: contract.plan,
            features,
        })
    }
}
